use std::path::PathBuf;

use fieldlight_lib::agent_engine::state::AgentMode;
use fieldlight_lib::config::load_config_from;
use fieldlight_lib::record::context::read_context;
use fieldlight_lib::record::source::JsonRecordSource;
use fieldlight_lib::visual::locator::{DisplayLocator, LabelBoard};

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

#[test]
fn demo_config_parses() {
    let cfg = load_config_from(&demo("config.toml")).unwrap();
    assert_eq!(cfg.llm.active_provider, "local");
    assert!(!cfg.llm.roles.planning.as_ref().unwrap().stream);
    assert!(cfg.llm.roles.chat.as_ref().unwrap().stream);
    assert_eq!(cfg.agent.start_mode, AgentMode::Agent);
    assert_eq!(cfg.agent.default_flash_ms, 1800);
}

#[test]
fn demo_record_builds_context_index_and_board() {
    let ctx = read_context(&JsonRecordSource::new(demo("account.json"))).unwrap();

    assert!(ctx.text.contains("Email (email_addresses): info@acme.example, sales@acme.example"));
    assert!(ctx.text.contains("Assigned to (assigned_user): Sally Bronsen"));
    assert!(ctx.text.contains("Annual Revenue (annual_revenue): 1250000"));
    assert!(ctx.text.contains("Description (description): "));

    assert_eq!(ctx.index.resolve("Billing Address").as_deref(), Some("billing_address_city"));
    assert_eq!(ctx.index.resolve("industry").as_deref(), Some("industry"));

    // The Industry cell has no structural name and is found by its label text.
    let board = LabelBoard::from_snapshot(ctx.snapshot.as_ref().unwrap());
    assert!(board.locate("industry").is_some());
    assert!(board.locate("bogus").is_none());
}
