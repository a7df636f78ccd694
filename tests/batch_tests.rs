// tests/batch_tests.rs

use fname_lang::batch::Batch;
use fname_lang::config::CounterConfig;
use fname_lang::{Config, EvalError, FileContext, Platform, parse, sanitize_file_name};
use rstest::rstest;

fn contexts(names: &[&str]) -> Vec<FileContext> {
    names.iter().map(|name| FileContext::new(*name)).collect()
}

fn config(start: u64, step: u64, width: usize) -> Config {
    Config {
        counter: CounterConfig { start, step, width },
        ..Config::default()
    }
}

// ============================================================================
// Counter Assignment
// ============================================================================

#[test]
fn test_counter_starts_at_one() {
    let formula = parse("{counter}").unwrap();
    let items = Batch::new(&formula, &Config::default()).run(&contexts(&["a", "b", "c"]));
    let names: Vec<_> = items.iter().map(|i| i.result.clone().unwrap()).collect();
    assert_eq!(names, vec!["1", "2", "3"]);
    assert_eq!(items[2].counter, Some(3));
}

#[test]
fn test_counter_start_step_and_width() {
    let formula = parse("img_{counter}").unwrap();
    let items = Batch::new(&formula, &config(10, 5, 3)).run(&contexts(&["a", "b", "c"]));
    let names: Vec<_> = items.iter().map(|i| i.result.clone().unwrap()).collect();
    assert_eq!(names, vec!["img_010", "img_015", "img_020"]);
}

#[test]
fn test_explicit_padding_beats_width() {
    let formula = parse("{counter:#####}").unwrap();
    let items = Batch::new(&formula, &config(1, 1, 2)).run(&contexts(&["a"]));
    assert_eq!(items[0].result.as_deref(), Ok("00001"));
}

#[test]
fn test_counter_not_assigned_when_unused() {
    let formula = parse("{file:baseName}").unwrap();
    let items = Batch::new(&formula, &Config::default()).run(&contexts(&["a.txt"]));
    assert_eq!(items[0].counter, None);
}

#[test]
fn test_failed_item_keeps_its_counter() {
    let formula = parse("{counter}_{image:size}").unwrap();
    let mut inputs = contexts(&["a.txt", "b.png", "c.png"]);
    inputs[1] = inputs[1].clone().with_image_size(1, 1);
    inputs[2] = inputs[2].clone().with_image_size(2, 2);

    let items = Batch::new(&formula, &Config::default()).run(&inputs);
    assert!(matches!(
        items[0].result,
        Err(EvalError::KeywordUnavailable { .. })
    ));
    assert_eq!(items[1].result.as_deref(), Ok("2_1x1"));
    assert_eq!(items[2].result.as_deref(), Ok("3_2x2"));
}

#[test]
fn test_same_inputs_same_outputs() {
    let formula = parse("{counter:##}-{file:baseName}").unwrap();
    let inputs = contexts(&["x", "y"]);
    let batch = Batch::new(&formula, &Config::default());
    assert_eq!(batch.run(&inputs), batch.run(&inputs));
}

// ============================================================================
// Sanitizing
// ============================================================================

#[test]
fn test_results_are_sanitized() {
    let formula = parse("{file:path}:{file:baseName}").unwrap();
    let items = Batch::new(&formula, &Config::default())
        .with_platform(Platform::Windows)
        .run(&contexts(&["/tmp/a.txt"]));
    assert_eq!(items[0].result.as_deref(), Ok("tmpa"));
}

#[test]
fn test_keep_invalid_characters() {
    let formula = parse("{file:path}:{file:baseName}").unwrap();
    let config = Config {
        keep_invalid_characters: true,
        ..Config::default()
    };
    let items = Batch::new(&formula, &config)
        .with_platform(Platform::Windows)
        .run(&contexts(&["/tmp/a.txt"]));
    assert_eq!(items[0].result.as_deref(), Ok("/tmp:a"));
}

#[rstest]
#[case("plain.txt", Platform::Unix, "plain.txt")]
#[case("a/b", Platform::Unix, "ab")]
#[case("a:b|c", Platform::Unix, "a:b|c")]
#[case("a:b|c", Platform::Windows, "abc")]
#[case("<name>?", Platform::Windows, "name")]
fn test_sanitize_file_name(#[case] name: &str, #[case] platform: Platform, #[case] expected: &str) {
    assert_eq!(sanitize_file_name(name, platform), expected);
}

// ============================================================================
// Sources
// ============================================================================

#[test]
fn test_source_falls_back_to_position() {
    let formula = parse("x").unwrap();
    let items = Batch::new(&formula, &Config::default()).run(&[FileContext::default()]);
    assert_eq!(items[0].source, "#1");
}
