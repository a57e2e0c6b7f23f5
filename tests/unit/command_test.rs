//! Tests for console command parsing

use elastic_pool::runtime::Command;

#[test]
fn test_reserved_commands() {
    assert_eq!(Command::parse("add"), Command::AddWorker);
    assert_eq!(Command::parse("remove"), Command::RemoveWorker);
    assert_eq!(Command::parse("exit"), Command::Exit);
}

#[test]
fn test_blank_lines_are_empty() {
    assert_eq!(Command::parse(""), Command::Empty);
    assert_eq!(Command::parse("   \t"), Command::Empty);
}

#[test]
fn test_other_input_is_a_job() {
    assert_eq!(
        Command::parse("  resize photo.png "),
        Command::Submit("resize photo.png".to_string())
    );
    assert_eq!(Command::from("exit now"), Command::Submit("exit now".to_string()));
}
