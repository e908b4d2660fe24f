//! Many voters changing their minds at once on one shared poll

use rollcall_poll::{PollId, PollRecord, PollRegistry, VoteAggregator, VoteChange, VoteOutcome};
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn each_voter_ends_in_one_option() {
    let registry = PollRegistry::with_idle_ttl(16, Duration::from_secs(60));
    let poll = PollId::new("shared");
    registry
        .register(
            poll.clone(),
            PollRecord::new("Sunday?", vec!["Yes".into(), "No".into(), "Maybe".into()]).unwrap(),
        )
        .await;
    let votes = VoteAggregator::new(registry.clone());

    let tasks: Vec<_> = (0..32)
        .map(|voter| {
            let votes = votes.clone();
            tokio::spawn(async move {
                let handle = format!("@v{voter}");
                for round in 0..20usize {
                    let option = (voter + round) % 3;
                    votes.record(&VoteChange::new("shared", handle.as_str(), vec![option])).await;
                }
                // final answer
                votes.record(&VoteChange::new("shared", handle.as_str(), vec![voter % 3])).await
            })
        })
        .collect();

    for task in tasks {
        assert!(matches!(task.await.unwrap(), VoteOutcome::Recorded { option: Some(_) }));
    }

    let record = registry.snapshot(&poll).await.unwrap();
    assert_eq!(record.voter_count(), 32);
    for voter in 0..32usize {
        assert_eq!(record.option_of(&format!("@v{voter}")), Some(voter % 3));
    }
}

#[tokio::test]
async fn replaying_an_event_is_idempotent() {
    let registry = PollRegistry::default();
    registry
        .register(PollId::new("p"), PollRecord::new("Q", vec!["A".into(), "B".into()]).unwrap())
        .await;
    let votes = VoteAggregator::new(registry.clone());
    let change = VoteChange::new("p", "@x", vec![1]);

    votes.record(&change).await;
    let once = registry.snapshot(&PollId::new("p")).await.unwrap();
    votes.record(&change).await;
    let twice = registry.snapshot(&PollId::new("p")).await.unwrap();

    assert_eq!(once, twice);
}
