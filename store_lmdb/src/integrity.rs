//! Startup consistency checks for the LMDB environment.
//!
//! Every block is written together with one voter-position entry and one
//! verification-code entry. A healthy environment therefore has matching
//! counts across the three databases and no index entry pointing at a block
//! that does not exist.

use heed::types::Bytes;
use heed::{Database, RoTxn};

use crate::environment::LmdbEnvironment;
use crate::LmdbError;

/// Outcome of [`LmdbEnvironment::check_integrity`].
#[derive(Debug, Default)]
pub struct IntegrityReport {
    pub databases_checked: u32,
    pub total_entries: u64,
    pub errors: Vec<String>,
}

impl IntegrityReport {
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }
}

pub(crate) fn check_integrity(env: &LmdbEnvironment) -> Result<IntegrityReport, LmdbError> {
    let rtxn = env.env().read_txn()?;
    let mut report = IntegrityReport::default();

    let named = [
        ("blocks", env.blocks_db),
        ("voter_positions", env.voter_positions_db),
        ("verification_codes", env.codes_db),
        ("voter_registry", env.registry_db),
        ("audit_log", env.audit_db),
        ("meta", env.meta_db),
    ];
    let mut counts = [0u64; 3];
    for (i, (name, db)) in named.iter().enumerate() {
        report.databases_checked += 1;
        match db.len(&rtxn) {
            Ok(n) => {
                report.total_entries += n;
                if let Some(slot) = counts.get_mut(i) {
                    *slot = n;
                }
            }
            Err(e) => report.errors.push(format!("{name}: unreadable ({e})")),
        }
    }

    let [blocks, positions, codes] = counts;
    if positions != blocks {
        report
            .errors
            .push(format!("{positions} voter-position entries for {blocks} blocks"));
    }
    if codes != blocks {
        report
            .errors
            .push(format!("{codes} verification-code entries for {blocks} blocks"));
    }

    dangling_entries(&rtxn, env, env.voter_positions_db, "voter_positions", &mut report);
    dangling_entries(&rtxn, env, env.codes_db, "verification_codes", &mut report);

    Ok(report)
}

/// Record every index entry whose target block key is missing.
fn dangling_entries(
    rtxn: &RoTxn<'_>,
    env: &LmdbEnvironment,
    index: Database<Bytes, Bytes>,
    name: &str,
    report: &mut IntegrityReport,
) {
    let iter = match index.iter(rtxn) {
        Ok(iter) => iter,
        Err(e) => {
            report.errors.push(format!("{name}: cannot iterate ({e})"));
            return;
        }
    };
    let mut dangling = 0u64;
    for entry in iter {
        match entry {
            Ok((_, block_key)) => match env.blocks_db.get(rtxn, block_key) {
                Ok(Some(_)) => {}
                Ok(None) => dangling += 1,
                Err(e) => {
                    report.errors.push(format!("{name}: block lookup failed ({e})"));
                    return;
                }
            },
            Err(e) => {
                report.errors.push(format!("{name}: corrupt entry ({e})"));
                return;
            }
        }
    }
    if dangling > 0 {
        report
            .errors
            .push(format!("{name}: {dangling} entries point at missing blocks"));
    }
}
