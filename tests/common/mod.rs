//! Common test utilities and fixtures for mark-down integration tests

// Not every helper is used by every test module
#![allow(dead_code)]

use assert_cmd::Command;
use mark_down::models::SnippetMeta;
use mark_down::test_utils::SnippetFixture;
use std::path::Path;

/// Documents of a small documentation site.
pub const INTRO: &str = "---\nslug: intro\ntitle: Intro Override\ntags:\n  - docs\n  - start\ncustom: true\n---\n# Introduction\n\nWelcome.\n";
pub const BUTTON: &str = "---\ntitle: Button\ntype: component\ntags: ui, action\norder: 2\n---\n# Button\n\nButtons trigger actions.\n";
pub const CARD: &str = "---\ntitle: Card\ntype: component\ntags: [ui, layout]\norder: 1\n---\n# Card\n";
pub const DRAFT: &str = "---\ntitle: Unfinished\ndraft: true\n---\nNot yet.\n";

/// Write the sample site below `root`.
pub fn write_sample_site(root: &Path) -> SnippetFixture {
    let fixture = SnippetFixture::new(root);
    fixture.write_document("guides/intro.md", INTRO).unwrap();
    fixture.write_document("components/button.md", BUTTON).unwrap();
    fixture.write_document("components/card.md", CARD).unwrap();
    fixture.write_document("wip.md", DRAFT).unwrap();
    fixture
}

/// Manifest entries matching the sample site.
pub fn sample_manifest() -> Vec<SnippetMeta> {
    let mut intro = SnippetMeta::new("intro", "guides/intro.md");
    intro.title = Some("Introduction".to_string());
    intro.snippet_type = Some("guide".to_string());
    intro.group = Some(Some("guides".to_string()));

    let mut button = SnippetMeta::new("button", "components/button.md");
    button.title = Some("Button".to_string());
    button.snippet_type = Some("component".to_string());
    button.tags = Some(vec!["ui".to_string(), "action".to_string()]);
    button.group = Some(Some("components".to_string()));

    let mut card = SnippetMeta::new("card", "components/card.md");
    card.snippet_type = Some("component".to_string());
    card.tags = Some(vec!["ui".to_string(), "layout".to_string()]);
    card.group = Some(Some("components".to_string()));

    vec![intro, button, card]
}

/// The `mark-down` binary, isolated from any configuration in the environment.
pub fn mark_down(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("mark-down").unwrap();
    cmd.current_dir(dir).env_remove("MARK_DOWN_CONFIG").env_remove("RUST_LOG");
    cmd
}
