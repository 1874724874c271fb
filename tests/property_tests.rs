//! Properties that hold for every utterance

mod fixtures;

use fixtures::mock_services::MockStrategy;
use pgnl_agent::nlp::{EntityExtractor, IntentLabel, UnderstandingPipeline};
use pgnl_agent::sql::{is_accepted_statement, QuerySynthesizer};
use proptest::prelude::*;
use std::sync::Arc;
use tokio::runtime::Runtime;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

/// Sentences built from the words the extractor and classifier react to
fn utterance() -> impl Strategy<Value = String> {
    let word = prop_oneof![
        Just("all".to_string()),
        Just("from".to_string()),
        Just("in".to_string()),
        Just("table".to_string()),
        Just("the".to_string()),
        Just("of".to_string()),
        Just("show me".to_string()),
        Just("how many".to_string()),
        Just("delete".to_string()),
        Just("last week".to_string()),
        Just("today".to_string()),
        "[a-z0-9_]{1,8}",
        "[0-9]{1,25}",
    ];
    prop::collection::vec(word, 0..12).prop_map(|words| words.join(" "))
}

fn any_text() -> impl Strategy<Value = String> {
    prop_oneof![any::<String>(), utterance()]
}

proptest! {
    #[test]
    fn prop_process_yields_known_label_and_bounded_confidence(text in any_text()) {
        let understanding = runtime().block_on(UnderstandingPipeline::new().process(&text));

        prop_assert!(IntentLabel::ALL.contains(&understanding.intent()));
        prop_assert!((0.0..=1.0).contains(&understanding.confidence()));
        prop_assert_eq!(understanding.original_text(), text.as_str());
    }

    #[test]
    fn prop_synthesized_statement_is_accepted(text in any_text(), generated in any::<String>()) {
        let rt = runtime();
        let understanding = rt.block_on(UnderstandingPipeline::new().process(&text));

        let sql = rt.block_on(QuerySynthesizer::new().synthesize(&understanding));
        prop_assert!(is_accepted_statement(&sql), "template produced {:?}", sql);

        let synthesizer = QuerySynthesizer::new()
            .with_strategy(Arc::new(MockStrategy::producing(&generated)));
        let sql = rt.block_on(synthesizer.synthesize(&understanding));
        prop_assert!(is_accepted_statement(&sql), "strategy chain produced {:?}", sql);
    }

    #[test]
    fn prop_extraction_is_idempotent(text in any_text()) {
        let extractor = EntityExtractor::new();
        prop_assert_eq!(extractor.extract(&text), extractor.extract(&text));
        prop_assert_eq!(
            EntityExtractor::new().extract(&text),
            extractor.extract(&text)
        );
    }

    #[test]
    fn prop_extracted_table_starts_with_letter(text in utterance()) {
        if let Some(table) = EntityExtractor::new().extract(&text).table {
            prop_assert!(table.starts_with(|c: char| c.is_ascii_lowercase()));
            let function_words = ["of", "in", "from", "the", "all", "last", "today"];
            prop_assert!(!function_words.contains(&table.as_str()));
        }
    }
}
