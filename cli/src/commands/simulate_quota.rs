//! Simulate-quota command implementation
//!
//! Grants a throwaway invitation a link allowance and lets a pool of tokio
//! workers race to admit more guests than it allows. The report shows the
//! ceiling held: exactly `min(guests, granted)` consumes succeed.

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use anyhow::{anyhow, bail, Result};
use invitely_core::{
    grant_quota, EventDispatcher, GuardEvent, InMemoryQuotaStore, InvitationId, LinkKind,
    QuotaError, QuotaStore,
};
use serde::Serialize;
use tracing::{debug, info};

use super::OutputFormat;

/// Parameters for a quota simulation run
#[derive(Debug, Clone)]
pub struct SimulateQuotaRequest {
    pub regular: u32,
    pub test: u32,
    pub guests: u32,
    pub workers: usize,
    pub kind: LinkKind,
}

/// Outcome of a simulation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    pub kind: LinkKind,
    pub granted: u32,
    pub guests: u32,
    pub workers: usize,
    pub admitted: u32,
    pub rejected: u32,
    pub remaining: u32,
    pub events_forwarded: u32,
}

/// Execute the quota simulation
///
/// # Errors
/// Returns error if `workers` is zero, a worker task fails, or the number of
/// admitted guests differs from `min(guests, granted)`
pub async fn execute(request: &SimulateQuotaRequest, output_format: OutputFormat) -> Result<String> {
    let report = run(request).await?;

    match output_format {
        OutputFormat::Human => Ok(format!(
            "Quota simulation ({} links)\n\n\
             Granted:          {}\n\
             Guests:           {}\n\
             Workers:          {}\n\
             Admitted:         {}\n\
             Rejected:         {}\n\
             Remaining:        {}\n\
             Events forwarded: {}",
            report.kind,
            report.granted,
            report.guests,
            report.workers,
            report.admitted,
            report.rejected,
            report.remaining,
            report.events_forwarded,
        )),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&report)?),
    }
}

/// Run the simulation and check the ceiling held
///
/// # Errors
/// See [`execute`]
pub async fn run(request: &SimulateQuotaRequest) -> Result<SimulationReport> {
    if request.workers == 0 {
        bail!("Simulation needs at least one worker");
    }

    let store = Arc::new(InMemoryQuotaStore::new());
    let invitation = InvitationId::from("simulation");
    grant_quota(store.as_ref(), &invitation, request.regular, request.test)?;
    let granted = match request.kind {
        LinkKind::Regular => request.regular,
        LinkKind::Test => request.test,
    };

    let (dispatcher, mut receiver) = EventDispatcher::channel();
    let next_guest = Arc::new(AtomicU32::new(0));
    let admitted = Arc::new(AtomicU32::new(0));
    let rejected = Arc::new(AtomicU32::new(0));

    info!(
        granted,
        guests = request.guests,
        workers = request.workers,
        kind = %request.kind,
        "starting quota simulation"
    );

    let mut handles = Vec::with_capacity(request.workers);
    for worker in 0..request.workers {
        let store = Arc::clone(&store);
        let invitation = invitation.clone();
        let dispatcher = dispatcher.clone();
        let next_guest = Arc::clone(&next_guest);
        let admitted = Arc::clone(&admitted);
        let rejected = Arc::clone(&rejected);
        let kind = request.kind;
        let guests = request.guests;

        handles.push(tokio::spawn(async move {
            loop {
                let guest = next_guest.fetch_add(1, Ordering::Relaxed);
                if guest >= guests {
                    break;
                }
                match store.consume(&invitation, kind) {
                    Ok(event) => {
                        admitted.fetch_add(1, Ordering::Relaxed);
                        dispatcher.forward(event);
                    }
                    Err(QuotaError::QuotaExceeded { .. }) => {
                        rejected.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => return Err(e),
                }
                tokio::task::yield_now().await;
            }
            debug!(worker, "simulation worker finished");
            Ok(())
        }));
    }

    for handle in handles {
        handle
            .await
            .map_err(|e| anyhow!("Simulation worker panicked: {e}"))??;
    }

    drop(dispatcher);
    let mut events_forwarded: u32 = 0;
    while let Some(event) = receiver.recv().await {
        if matches!(event, GuardEvent::QuotaConsumed(_)) {
            events_forwarded = events_forwarded.saturating_add(1);
        }
    }

    let report = SimulationReport {
        kind: request.kind,
        granted,
        guests: request.guests,
        workers: request.workers,
        admitted: admitted.load(Ordering::Acquire),
        rejected: rejected.load(Ordering::Acquire),
        remaining: store.remaining(&invitation, request.kind),
        events_forwarded,
    };

    let expected = request.guests.min(granted);
    if report.admitted != expected {
        bail!(
            "Quota ceiling violated: admitted {} guests, expected {expected}",
            report.admitted
        );
    }

    info!(
        admitted = report.admitted,
        rejected = report.rejected,
        "quota simulation finished"
    );
    Ok(report)
}
