use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatePart {
    /// `YYYYMMDD`
    Full,
    Year,
    Month,
    Day,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimePart {
    /// `HHMMSS`
    Full,
    Hours,
    Minutes,
    Seconds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 4] = [
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha512,
    ];

    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }

    /// Length of the hexadecimal digest
    pub fn hex_len(self) -> usize {
        match self {
            HashAlgorithm::Md5 => 32,
            HashAlgorithm::Sha1 => 40,
            HashAlgorithm::Sha256 => 64,
            HashAlgorithm::Sha512 => 128,
        }
    }
}

/// A resolved keyword path.
///
/// `padding` holds the width given by a trailing `#` run
/// (`{counter:####}` pads to 4 digits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Counter { padding: Option<usize> },
    ImageSize,
    ImageWidth { padding: Option<usize> },
    ImageHeight { padding: Option<usize> },
    Date(DatePart),
    Time(TimePart),
    FileDate(DatePart),
    FileTime(TimePart),
    FilePath,
    FileBaseName,
    FileExt,
    FileFormat,
    FileHash(HashAlgorithm),
}

/// Why a keyword path does not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathError {
    /// The segment at `index` is not valid at that position
    Unknown { index: usize },
    /// The path stops before reaching a keyword
    Incomplete,
}

fn padding_width(rest: &[&str], index: usize) -> Result<Option<usize>, PathError> {
    match rest {
        [] => Ok(None),
        [hashes] if !hashes.is_empty() && hashes.chars().all(|c| c == '#') => Ok(Some(hashes.len())),
        [_] => Err(PathError::Unknown { index }),
        _ => Err(PathError::Unknown { index: index + 1 }),
    }
}

fn date_part(rest: &[&str], index: usize) -> Result<DatePart, PathError> {
    match rest {
        [] => Ok(DatePart::Full),
        ["yyyy"] => Ok(DatePart::Year),
        ["mm"] => Ok(DatePart::Month),
        ["dd"] => Ok(DatePart::Day),
        [_] => Err(PathError::Unknown { index }),
        _ => Err(PathError::Unknown { index: index + 1 }),
    }
}

fn time_part(rest: &[&str], index: usize) -> Result<TimePart, PathError> {
    match rest {
        [] => Ok(TimePart::Full),
        ["hh"] => Ok(TimePart::Hours),
        ["mm"] => Ok(TimePart::Minutes),
        ["ss"] => Ok(TimePart::Seconds),
        [_] => Err(PathError::Unknown { index }),
        _ => Err(PathError::Unknown { index: index + 1 }),
    }
}

fn leaf(keyword: Keyword, rest: &[&str], index: usize) -> Result<Keyword, PathError> {
    if rest.is_empty() {
        Ok(keyword)
    } else {
        Err(PathError::Unknown { index })
    }
}

impl Keyword {
    /// Walks the keyword tree along `segments`, ignoring ASCII case.
    pub fn resolve(segments: &[&str]) -> Result<Keyword, PathError> {
        let lowered: Vec<String> = segments.iter().map(|s| s.to_ascii_lowercase()).collect();
        let segments: Vec<&str> = lowered.iter().map(String::as_str).collect();
        Self::resolve_lowercase(&segments)
    }

    fn resolve_lowercase(segments: &[&str]) -> Result<Keyword, PathError> {
        match segments {
            [] => Err(PathError::Incomplete),
            ["counter", rest @ ..] => Ok(Keyword::Counter {
                padding: padding_width(rest, 1)?,
            }),
            ["date", rest @ ..] => Ok(Keyword::Date(date_part(rest, 1)?)),
            ["time", rest @ ..] => Ok(Keyword::Time(time_part(rest, 1)?)),

            ["image"] => Err(PathError::Incomplete),
            ["image", "size"] => Ok(Keyword::ImageSize),
            ["image", "size", "width", rest @ ..] => Ok(Keyword::ImageWidth {
                padding: padding_width(rest, 3)?,
            }),
            ["image", "size", "height", rest @ ..] => Ok(Keyword::ImageHeight {
                padding: padding_width(rest, 3)?,
            }),
            ["image", "size", ..] => Err(PathError::Unknown { index: 2 }),
            ["image", ..] => Err(PathError::Unknown { index: 1 }),

            ["file"] => Err(PathError::Incomplete),
            ["file", "date", rest @ ..] => Ok(Keyword::FileDate(date_part(rest, 2)?)),
            ["file", "time", rest @ ..] => Ok(Keyword::FileTime(time_part(rest, 2)?)),
            ["file", "path", rest @ ..] => leaf(Keyword::FilePath, rest, 2),
            ["file", "basename", rest @ ..] => leaf(Keyword::FileBaseName, rest, 2),
            ["file", "ext", rest @ ..] => leaf(Keyword::FileExt, rest, 2),
            ["file", "format", rest @ ..] => leaf(Keyword::FileFormat, rest, 2),
            ["file", "hash"] => Err(PathError::Incomplete),
            ["file", "hash", algorithm, rest @ ..] => {
                let algorithm =
                    HashAlgorithm::from_name(algorithm).ok_or(PathError::Unknown { index: 2 })?;
                leaf(Keyword::FileHash(algorithm), rest, 3)
            }
            ["file", ..] => Err(PathError::Unknown { index: 1 }),

            _ => Err(PathError::Unknown { index: 0 }),
        }
    }

    /// Canonical colon-separated path, e.g. `image:size:width:####`
    pub fn path(&self) -> String {
        fn date(prefix: &str, part: DatePart) -> String {
            match part {
                DatePart::Full => prefix.to_string(),
                DatePart::Year => format!("{prefix}:yyyy"),
                DatePart::Month => format!("{prefix}:mm"),
                DatePart::Day => format!("{prefix}:dd"),
            }
        }
        fn time(prefix: &str, part: TimePart) -> String {
            match part {
                TimePart::Full => prefix.to_string(),
                TimePart::Hours => format!("{prefix}:hh"),
                TimePart::Minutes => format!("{prefix}:mm"),
                TimePart::Seconds => format!("{prefix}:ss"),
            }
        }
        fn padded(prefix: &str, padding: Option<usize>) -> String {
            match padding {
                Some(width) => format!("{prefix}:{}", "#".repeat(width)),
                None => prefix.to_string(),
            }
        }

        match self {
            Keyword::Counter { padding } => padded("counter", *padding),
            Keyword::ImageSize => "image:size".to_string(),
            Keyword::ImageWidth { padding } => padded("image:size:width", *padding),
            Keyword::ImageHeight { padding } => padded("image:size:height", *padding),
            Keyword::Date(part) => date("date", *part),
            Keyword::Time(part) => time("time", *part),
            Keyword::FileDate(part) => date("file:date", *part),
            Keyword::FileTime(part) => time("file:time", *part),
            Keyword::FilePath => "file:path".to_string(),
            Keyword::FileBaseName => "file:baseName".to_string(),
            Keyword::FileExt => "file:ext".to_string(),
            Keyword::FileFormat => "file:format".to_string(),
            Keyword::FileHash(algorithm) => format!("file:hash:{}", algorithm.name()),
        }
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.path())
    }
}

/// Documentation entry for one keyword form.
#[derive(Debug)]
pub struct KeywordDoc {
    pub syntax: &'static str,
    pub description: &'static str,
}

const fn doc(syntax: &'static str, description: &'static str) -> KeywordDoc {
    KeywordDoc {
        syntax,
        description,
    }
}

pub static KEYWORDS: &[KeywordDoc] = &[
    doc("{file:path}", "Directory containing the file"),
    doc("{file:baseName}", "File name without directory and extension"),
    doc("{file:ext}", "File extension, without the dot"),
    doc("{file:format}", "File format (can differ from the extension, e.g. jpeg for .jpg)"),
    doc("{file:date}", "File modification date, YYYYMMDD"),
    doc("{file:date:yyyy}", "Year of the file modification date"),
    doc("{file:date:mm}", "Month of the file modification date, 2 digits"),
    doc("{file:date:dd}", "Day of the file modification date, 2 digits"),
    doc("{file:time}", "File modification time, HHMMSS"),
    doc("{file:time:hh}", "Hours of the file modification time, 2 digits"),
    doc("{file:time:mm}", "Minutes of the file modification time, 2 digits"),
    doc("{file:time:ss}", "Seconds of the file modification time, 2 digits"),
    doc("{file:hash:md5}", "MD5 hash of the file content (32 characters)"),
    doc("{file:hash:sha1}", "SHA-1 hash of the file content (40 characters)"),
    doc("{file:hash:sha256}", "SHA-256 hash of the file content (64 characters)"),
    doc("{file:hash:sha512}", "SHA-512 hash of the file content (128 characters)"),
    doc("{image:size}", "Image size, WxH"),
    doc("{image:size:width}", "Image width"),
    doc("{image:size:width:####}", "Image width, zero-padded to the number of #"),
    doc("{image:size:height}", "Image height"),
    doc("{image:size:height:####}", "Image height, zero-padded to the number of #"),
    doc("{date}", "Current date, YYYYMMDD"),
    doc("{date:yyyy}", "Current year"),
    doc("{date:mm}", "Current month, 2 digits"),
    doc("{date:dd}", "Current day, 2 digits"),
    doc("{time}", "Current time, HHMMSS"),
    doc("{time:hh}", "Current hours, 2 digits"),
    doc("{time:mm}", "Current minutes, 2 digits"),
    doc("{time:ss}", "Current seconds, 2 digits"),
    doc("{counter}", "Batch counter, padded to the configured width"),
    doc("{counter:####}", "Batch counter, zero-padded to the number of #"),
];
