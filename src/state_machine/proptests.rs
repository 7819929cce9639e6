//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::*;
use crate::content::Catalog;
use crate::db::{Lead, LeadField, NewLead};
use proptest::prelude::*;
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> IntakeContext {
    IntakeContext::new(
        Arc::new(Catalog::bundled().unwrap()),
        FlowSettings::default(),
    )
}

fn lead_in(status: LeadStatus) -> Lead {
    let mut lead = NewLead::new("whatsapp:+1").into_lead(1);
    lead.status = status;
    lead
}

fn run(ctx: &IntakeContext, status: LeadStatus, text: &str) -> TransitionResult {
    let event = Event::classify(text, &ctx.settings);
    transition(&Snapshot::of(lead_in(status)), ctx, event)
}

fn non_terminal() -> Vec<LeadStatus> {
    LeadStatus::ALL
        .into_iter()
        .filter(|s| !s.is_terminal())
        .collect()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_status() -> impl Strategy<Value = LeadStatus> {
    prop::sample::select(LeadStatus::ALL.to_vec())
}

fn arb_active_status() -> impl Strategy<Value = LeadStatus> {
    prop::sample::select(non_terminal())
}

fn arb_out_of_range_year() -> impl Strategy<Value = i32> {
    prop_oneof![0i32..2007, 2016i32..100_000, -5000i32..0]
}

/// Inputs each state's validator must reject
fn arb_invalid_input() -> impl Strategy<Value = (LeadStatus, String)> {
    prop_oneof![
        "[a-z]{0,5}[0-9!?#]{1,3}[a-z ]{0,5}".prop_map(|s| (LeadStatus::AwaitingName, s)),
        "[a-z. ]{0,20}".prop_map(|s| (LeadStatus::AwaitingEmail, s)),
        "[ ]{0,3}".prop_map(|s| (LeadStatus::AwaitingAddress, s)),
        (4u32..1000).prop_map(|n| (LeadStatus::AwaitingModel, n.to_string())),
        "[a-z]{1,8}".prop_map(|s| (LeadStatus::AwaitingModel, s)),
        "[a-z]{1,8}".prop_map(|s| (LeadStatus::AwaitingYear, s)),
        arb_out_of_range_year().prop_map(|y| (LeadStatus::AwaitingYear, y.to_string())),
        (5u32..1000).prop_map(|n| (LeadStatus::AwaitingStorage, n.to_string())),
        (3u32..1000).prop_map(|n| (LeadStatus::AwaitingContinue, n.to_string())),
        (21u32..1000).prop_map(|n| (LeadStatus::AwaitingItems, n.to_string())),
        "[a-z]{1,8}".prop_map(|s| (LeadStatus::AwaitingItems, s)),
        (3u32..1000).prop_map(|n| (LeadStatus::AwaitingLocationConsent, n.to_string())),
    ]
}

fn arb_exit_text() -> impl Strategy<Value = String> {
    ("[ ]{0,3}", "[ ]{0,3}").prop_map(|(pre, post)| format!("{pre}9{post}"))
}

/// Distinct item codes from the bundled catalog, in arbitrary order
fn arb_item_codes() -> impl Strategy<Value = Vec<String>> {
    let codes: Vec<String> = test_context()
        .catalog
        .items
        .codes()
        .into_iter()
        .map(str::to_string)
        .collect();
    let len = codes.len();
    prop::sample::subsequence(codes, 0..=len).prop_shuffle()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Invalid input never mutates state and always explains itself
    #[test]
    fn prop_invalid_input_is_noop((status, text) in arb_invalid_input()) {
        let ctx = test_context();
        prop_assume!(Event::classify(&text, &ctx.settings) != Event::Exit);

        let result = run(&ctx, status, &text);
        prop_assert!(result.is_noop(), "{status} accepted {text:?}");
        prop_assert_eq!(result.new_status, Some(status));
        prop_assert!(!result.reply.is_empty());
    }

    /// Exit from any non-terminal state finishes the lead
    #[test]
    fn prop_exit_finishes_active_lead(status in arb_active_status(), text in arb_exit_text()) {
        let ctx = test_context();
        let result = run(&ctx, status, &text);
        prop_assert_eq!(result.new_status, Some(LeadStatus::Done));
        prop_assert_eq!(result.effects, vec![Effect::finish()]);
    }

    /// Every status and input yields a non-empty reply
    #[test]
    fn prop_always_replies(status in arb_status(), text in ".{0,40}") {
        let ctx = test_context();
        let result = run(&ctx, status, &text);
        prop_assert!(!result.reply.is_empty());
        prop_assert!(result.effects.len() <= 1);
    }

    /// Only a greeting creates a lead
    #[test]
    fn prop_only_greeting_creates(text in ".{0,40}", done in any::<bool>()) {
        let ctx = test_context();
        let snapshot = if done { Snapshot::of(lead_in(LeadStatus::Done)) } else { Snapshot::empty() };
        let event = Event::classify(&text, &ctx.settings);
        let is_greeting = matches!(event, Event::Greeting { .. });

        let result = transition(&snapshot, &ctx, event);
        prop_assert_eq!(result.effects.contains(&Effect::CreateLead), is_greeting);
        prop_assert!(result.effects.iter().all(|e| matches!(e, Effect::CreateLead)));
    }

    /// Every year in range is accepted; the locked year carries the warning
    #[test]
    fn prop_year_in_range_accepted(year in 2007i32..=2015) {
        let ctx = test_context();
        let result = run(&ctx, LeadStatus::AwaitingYear, &year.to_string());
        prop_assert_eq!(result.new_status, Some(LeadStatus::AwaitingStorage));
        prop_assert_eq!(
            result.effects,
            vec![Effect::advance(LeadStatus::AwaitingStorage, LeadField::ManufactureYear(year))]
        );
        prop_assert_eq!(result.reply.contains("cannot be permanently unlocked"), year == 2015);
    }

    /// Item selections are accepted exactly when the count is within bounds
    #[test]
    fn prop_item_count_bounds(
        codes in arb_item_codes(),
        min in 1usize..=5,
        span in 0usize..=5,
    ) {
        let mut ctx = test_context();
        ctx.settings.min_items = min;
        ctx.settings.max_items = min + span;

        let text = codes.join(",");
        prop_assume!(Event::classify(&text, &ctx.settings) != Event::Exit);

        let result = run(&ctx, LeadStatus::AwaitingItems, &text);
        let within = (ctx.settings.min_items..=ctx.settings.max_items).contains(&codes.len());
        if within {
            prop_assert_eq!(result.new_status, Some(LeadStatus::AwaitingLocationConsent));
            let labels: Vec<&str> = codes
                .iter()
                .map(|c| ctx.catalog.items.get(c).unwrap())
                .collect();
            prop_assert_eq!(
                result.effects,
                vec![Effect::advance(
                    LeadStatus::AwaitingLocationConsent,
                    LeadField::SelectedItems(labels.join(", ")),
                )]
            );
        } else {
            prop_assert!(result.is_noop());
            prop_assert_eq!(result.new_status, Some(LeadStatus::AwaitingItems));
        }
    }

    /// Repeating an invalid answer is idempotent
    #[test]
    fn prop_repeated_invalid_input_same_reply((status, text) in arb_invalid_input()) {
        let ctx = test_context();
        prop_assume!(Event::classify(&text, &ctx.settings) != Event::Exit);

        let first = run(&ctx, status, &text);
        let second = run(&ctx, status, &text);
        prop_assert_eq!(first, second);
    }
}
