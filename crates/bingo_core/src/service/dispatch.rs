//! Mutation dispatch from a view model to the grid gateway.
//!
//! Writes are issued one by one and are independent: a failure is reported
//! back to the view model as a notice and the remaining writes still go out.
//! Nothing is retried and nothing is rolled back.

use crate::interaction::view_model::{GridViewModel, Mutation};
use crate::repo::grid_repo::GridRepository;
use crate::repo::RepoResult;
use log::{debug, error};

/// Counts of one dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub applied: usize,
    pub failed: usize,
}

/// Drains `view`'s outbox into `gateway`.
pub fn dispatch_mutations<G: GridRepository + ?Sized>(
    gateway: &G,
    view: &mut GridViewModel,
) -> DispatchReport {
    let mut report = DispatchReport::default();
    for mutation in view.take_mutations() {
        match apply_mutation(gateway, &mutation) {
            Ok(()) => {
                report.applied += 1;
                debug!(
                    "event=mutation_apply module=service status=ok kind={}",
                    mutation.kind()
                );
            }
            Err(err) => {
                report.failed += 1;
                error!(
                    "event=mutation_apply module=service status=error kind={} error={}",
                    mutation.kind(),
                    err
                );
                view.report_failure(mutation, &err.to_string());
            }
        }
    }
    report
}

fn apply_mutation<G: GridRepository + ?Sized>(gateway: &G, mutation: &Mutation) -> RepoResult<()> {
    match mutation {
        Mutation::CellText { cell_id, text } => gateway.update_cell_text(*cell_id, text),
        Mutation::CellCompletion { cell_id, completed } => {
            gateway.update_cell_completion(*cell_id, *completed)
        }
        Mutation::Quote { grid_id, text } => gateway.update_quote(*grid_id, text),
    }
}
