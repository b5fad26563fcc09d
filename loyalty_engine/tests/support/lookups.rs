use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use futures_util::{future::BoxFuture, FutureExt};
use loyalty_engine::{
    accrual_client::{AccrualApiError, AccrualLookup, AccrualStatus},
    db_types::OrderNumber,
};
use mockall::{mock, TimesRange};

type Answer = Result<AccrualStatus, AccrualApiError>;

mock! {
    pub AccrualSystem {
        pub fn status_of(&self, number: &OrderNumber) -> BoxFuture<'static, Answer>;
    }
}

impl MockAccrualSystem {
    /// Answers lookups for `number` straight away.
    pub fn answer(&mut self, number: &OrderNumber, answer: Answer, times: impl Into<TimesRange>) {
        let expected = number.clone();
        self.expect_status_of()
            .withf(move |n| *n == expected)
            .times(times)
            .returning(move |_| futures_util::future::ready(answer.clone()).boxed());
    }

    /// Answers lookups for `number` only after `delay`. Any number of lookups is fine.
    pub fn answer_slowly(&mut self, number: &OrderNumber, answer: Answer, delay: Duration) {
        let expected = number.clone();
        self.expect_status_of().withf(move |n| *n == expected).returning(move |_| {
            let answer = answer.clone();
            async move {
                tokio::time::sleep(delay).await;
                answer
            }
            .boxed()
        });
    }

    /// Every lookup panics while it is being awaited.
    pub fn explode(&mut self) {
        self.expect_status_of().returning(|number| exploding_lookup(number.clone()));
    }
}

fn exploding_lookup(number: OrderNumber) -> BoxFuture<'static, Answer> {
    async move { panic!("The accrual lookup for {number} blew up") }.boxed()
}

/// Shares one [`MockAccrualSystem`] between every clone the pipeline makes, and counts the lookups.
///
/// Expectations are verified when the last clone is dropped.
#[derive(Clone)]
pub struct MockLookup {
    system: Arc<MockAccrualSystem>,
    calls: Arc<AtomicUsize>,
}

impl MockLookup {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockLookup {
    fn default() -> Self {
        MockAccrualSystem::new().into()
    }
}

impl From<MockAccrualSystem> for MockLookup {
    fn from(system: MockAccrualSystem) -> Self {
        Self { system: Arc::new(system), calls: Arc::new(AtomicUsize::new(0)) }
    }
}

impl AccrualLookup for MockLookup {
    async fn lookup(&self, number: &OrderNumber, _timeout: Duration) -> Answer {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.system.status_of(number).await
    }
}
