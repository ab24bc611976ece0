use paperqa_llm::ProtocolEvent;
use paperqa_types::{Role, Step, Transcript};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Begin(String),
    Apply(ProtocolEvent),
    Abort,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[a-z ?]{1,12}".prop_map(Op::Begin),
        "[a-z ]{0,8}".prop_map(|t| Op::Apply(ProtocolEvent::content(t))),
        prop::collection::vec("p\\.[0-9]", 0..3).prop_map(|s| Op::Apply(ProtocolEvent::sources(s))),
        Just(Op::Apply(ProtocolEvent::Completion)),
        "[a-z ]{1,8}".prop_map(|e| Op::Apply(ProtocolEvent::failure(e))),
        Just(Op::Abort),
    ]
}

fn streaming_count(transcript: &Transcript) -> usize {
    transcript.iter().filter(|m| m.is_streaming()).count()
}

proptest! {
    #[test]
    fn at_most_one_streaming_message_and_it_is_last(ops in prop::collection::vec(arb_op(), 0..40)) {
        let mut transcript = Transcript::new();

        for op in ops {
            let _ = match op {
                Op::Begin(q) => transcript.begin_exchange(q).map(|_| ()),
                Op::Apply(event) => transcript.apply_event(event).map(|_| ()),
                Op::Abort => {
                    transcript.abort_exchange();
                    Ok(())
                }
            };

            prop_assert!(streaming_count(&transcript) <= 1);
            if streaming_count(&transcript) == 1 {
                prop_assert!(transcript.last().unwrap().is_streaming());
            }
        }
    }

    #[test]
    fn failed_exchange_grows_transcript_by_question_only(
        deltas in prop::collection::vec("[a-z ]{0,6}", 0..6),
        error in "[a-z ]{1,10}",
    ) {
        let mut transcript = Transcript::new();
        transcript.begin_exchange("earlier").unwrap();
        transcript.apply_event(ProtocolEvent::Completion).unwrap();
        let before = transcript.len();

        transcript.begin_exchange("question").unwrap();
        for delta in deltas {
            prop_assert_eq!(transcript.apply_event(ProtocolEvent::content(delta)).unwrap(), Step::Pending);
        }
        let step = transcript.apply_event(ProtocolEvent::failure(error.clone())).unwrap();

        prop_assert_eq!(step, Step::Failed { message: error });
        prop_assert_eq!(transcript.len(), before + 1);
        prop_assert_eq!(transcript.last().unwrap().role(), Role::User);
        prop_assert_eq!(transcript.last().unwrap().content(), "question");
    }

    #[test]
    fn completed_exchange_holds_concatenated_deltas(
        deltas in prop::collection::vec("[a-zα-ω $\\\\]{0,6}", 0..10),
    ) {
        let mut transcript = Transcript::new();
        transcript.begin_exchange("q").unwrap();
        for delta in &deltas {
            transcript.apply_event(ProtocolEvent::content(delta.clone())).unwrap();
        }
        transcript.apply_event(ProtocolEvent::Completion).unwrap();

        let answer = transcript.last().unwrap();
        prop_assert_eq!(answer.content(), deltas.concat());
        prop_assert!(!answer.is_streaming());
        prop_assert_eq!(transcript.len(), 2);
    }
}
