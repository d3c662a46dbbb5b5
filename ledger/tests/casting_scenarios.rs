//! End-to-end ledger scenarios on the in-memory store with a deterministic
//! clock and random source.

use std::sync::Arc;
use std::thread;

use ballotchain_crypto::{recompute_hash, OsRandom};
use ballotchain_ledger::{
    AuditMode, BlockBuilder, BreakKind, CastError, CastRequest, ElectionCalendar, ElectionWindow,
    LedgerError, VerificationOutcome, VoteLedger,
};
use ballotchain_nullables::{FailPoint, NullClock, NullRandom, NullStore};
use ballotchain_store::{AuditLogStore, VoteChainStore, VoterRegistryStore};
use ballotchain_types::{
    AuditAction, BlockNumber, CandidateId, Clock, ElectionId, Position, PreviousHash,
    SystemClock, Timestamp, VerificationCode, VoteHash, VoterId,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

type TestLedger = VoteLedger<NullStore, NullClock, NullRandom, ElectionCalendar>;

fn e1() -> ElectionId {
    ElectionId::parse("E1").unwrap()
}

fn voter(id: &str) -> VoterId {
    VoterId::parse(id).unwrap()
}

fn position(name: &str) -> Position {
    Position::parse(name).unwrap()
}

fn calendar() -> ElectionCalendar {
    ElectionCalendar::new().with(ElectionWindow::new(
        e1(),
        "2100-01-01T00:00:00.000Z".parse().unwrap(),
    ))
}

fn ledger_with(random: NullRandom) -> TestLedger {
    VoteLedger::with_sources(
        NullStore::new(),
        calendar(),
        NullClock::at("2024-03-01T09:30:00.000Z"),
        random,
    )
}

fn ledger() -> TestLedger {
    ledger_with(NullRandom::counting())
}

fn request(v: &str, candidate: &str, pos: &str) -> CastRequest {
    CastRequest::new(
        voter(v),
        e1(),
        CandidateId::parse(candidate).unwrap(),
        position(pos),
    )
}

// ---------------------------------------------------------------------------
// 1. Casting and verifying
// ---------------------------------------------------------------------------

#[test]
fn cast_then_verify_then_duplicate() {
    let ledger = ledger();
    let code = ledger.cast_vote(&request("V1", "C1", "President")).unwrap();
    assert_eq!(code.as_str().len(), 14);
    assert_eq!(code.as_str().matches('-').count(), 2);

    let result = ledger.verify(code.as_str()).unwrap();
    assert!(result.verified);
    let block = result.block.unwrap();
    assert_eq!(block.position.as_str(), "President");
    assert_eq!(block.candidate_id.as_str(), "C1");
    assert_eq!(block.current_hash, recompute_hash(&block));

    let err = ledger
        .cast_vote(&request("V1", "C2", "President"))
        .unwrap_err();
    assert!(matches!(err, CastError::DuplicateVote { .. }));
    assert!(!err.is_retryable());

    let blocks = ledger.store().blocks_for_election(&e1()).unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].candidate_id.as_str(), "C1");
}

#[test]
fn deterministic_sources_reproduce_reference_hashes() {
    let mut bytes = vec![42, 0, 0, 0];
    bytes.extend(0..12u8);
    bytes.extend([7, 0, 0, 0]);
    bytes.extend(12..24u8);
    let ledger = ledger_with(NullRandom::new(bytes));

    let first = ledger.cast_vote(&request("V1", "C1", "President")).unwrap();
    ledger.clock().advance(60);
    let second = ledger.cast_vote(&request("V2", "C2", "President")).unwrap();
    assert_eq!(first.as_str(), "ABCD-EFGH-JKLM");
    assert_eq!(second.as_str(), "NPQR-STUV-WXYZ");

    let blocks = ledger.store().all_blocks();
    assert_eq!(
        blocks[0].current_hash.to_hex(),
        "a7a0fc836d7dcf3fb40863f7b3152b3905664699fd063af0c5a4884eca8b3791"
    );
    assert_eq!(blocks[1].previous_hash, PreviousHash::Block(blocks[0].current_hash));
    assert_eq!(
        blocks[1].current_hash.to_hex(),
        "ee159d08f63d350c6b6f8494cbb1a8e21009956e896bc271cad93dd7d35c4d23"
    );
    assert_eq!(blocks[1].timestamp.to_string(), "2024-03-01T09:31:00.000Z");
}

#[test]
fn verify_normalises_user_input() {
    let ledger = ledger();
    let code = ledger.cast_vote(&request("V1", "C1", "President")).unwrap();
    let typed = format!("  {}\n", code.as_str().to_lowercase());
    assert!(ledger.verify(&typed).unwrap().verified);
}

#[test]
fn malformed_code_skips_the_store() {
    let ledger = ledger();
    ledger.store().fail_at(FailPoint::Lookup);
    let result = ledger.verify("not-a-code").unwrap();
    assert!(!result.verified);
    assert_eq!(result.outcome, VerificationOutcome::MalformedCode);
}

#[test]
fn unknown_code_is_not_found() {
    let ledger = ledger();
    let result = ledger.verify("ZZZZ-ZZZZ-ZZZZ").unwrap();
    assert!(!result.verified);
    assert!(result.block.is_none());
    assert_eq!(result.outcome, VerificationOutcome::NotFound);
}

#[test]
fn lookup_failure_is_an_error() {
    let ledger = ledger();
    ledger.store().fail_at(FailPoint::Lookup);
    assert!(matches!(
        ledger.verify("ZZZZ-ZZZZ-ZZZZ"),
        Err(LedgerError::Store(_))
    ));
}

// ---------------------------------------------------------------------------
// 2. Preconditions
// ---------------------------------------------------------------------------

#[test]
fn unauthenticated_cast_is_rejected_before_the_store() {
    let ledger = ledger();
    let mut req = request("V1", "C1", "President");
    req.voter = None;
    assert!(matches!(
        ledger.cast_vote(&req),
        Err(CastError::NotAuthenticated)
    ));
    assert_eq!(ledger.store().block_count().unwrap(), 0);
}

#[test]
fn closed_and_unknown_elections_are_rejected() {
    let random = NullRandom::counting();
    let ended = ElectionCalendar::new().with(ElectionWindow::new(
        e1(),
        "2024-03-01T09:00:00.000Z".parse().unwrap(),
    ));
    let ledger = VoteLedger::with_sources(
        NullStore::new(),
        ended,
        NullClock::at("2024-03-01T09:30:00.000Z"),
        random,
    );

    assert!(matches!(
        ledger.cast_vote(&request("V1", "C1", "President")),
        Err(CastError::ElectionNotOpen { .. })
    ));
    let mut other = request("V1", "C1", "President");
    other.election = ElectionId::parse("E9").unwrap();
    assert!(matches!(
        ledger.cast_vote(&other),
        Err(CastError::ElectionNotOpen { .. })
    ));
    assert_eq!(ledger.store().block_count().unwrap(), 0);
}

/// A clock that moves forward one millisecond every time it is read.
struct TickingClock(NullClock);

impl Clock for TickingClock {
    fn now(&self) -> Timestamp {
        let now = self.0.now();
        self.0.advance_millis(1);
        now
    }
}

#[test]
fn block_is_stamped_with_the_instant_the_window_was_checked() {
    let last_instant: Timestamp = "2024-03-01T09:30:00.000Z".parse().unwrap();
    let closes = ElectionCalendar::new().with(ElectionWindow::new(
        e1(),
        "2024-03-01T09:30:00.001Z".parse().unwrap(),
    ));
    let ledger = VoteLedger::with_sources(
        NullStore::new(),
        closes,
        TickingClock(NullClock::at("2024-03-01T09:30:00.000Z")),
        NullRandom::counting(),
    );

    let code = ledger.cast_vote(&request("V1", "C1", "President")).unwrap();
    let block = ledger.verify(code.as_str()).unwrap().block.unwrap();
    assert_eq!(block.timestamp, last_instant);
}

// ---------------------------------------------------------------------------
// 3. Failures and races
// ---------------------------------------------------------------------------

#[test]
fn unreadable_tip_is_chain_state_unavailable() {
    let ledger = ledger();
    ledger.store().fail_at(FailPoint::TipHash);
    let err = ledger
        .cast_vote(&request("V1", "C1", "President"))
        .unwrap_err();
    assert!(matches!(err, CastError::ChainStateUnavailable(_)));
}

#[test]
fn failed_insert_is_retryable() {
    let ledger = ledger();
    ledger.store().fail_at(FailPoint::InsertBlock);
    let err = ledger
        .cast_vote(&request("V1", "C1", "President"))
        .unwrap_err();
    assert!(matches!(err, CastError::StoreWriteFailed(_)));
    assert!(err.is_retryable());

    ledger.store().clear_failures();
    assert!(ledger.cast_vote(&request("V1", "C1", "President")).is_ok());
}

#[test]
fn race_loser_retries_onto_the_new_tip() {
    let ledger = ledger();

    // A concurrent writer builds block 1 from the same empty tip.
    let clock = NullClock::at("2024-03-01T09:30:00.000Z");
    let random = NullRandom::constant(7);
    let rival = BlockBuilder::new(ledger.store(), &clock, &random)
        .build(&e1(), &voter("V9"), &CandidateId::parse("C3").unwrap(), &position("President"))
        .unwrap();
    let rival_hash = rival.current_hash;
    ledger.store().interleave_before_next_insert(rival);

    let err = ledger
        .cast_vote(&request("V1", "C1", "President"))
        .unwrap_err();
    match &err {
        CastError::ChainConflict { block_number, .. } => {
            assert_eq!(*block_number, BlockNumber::FIRST)
        }
        other => panic!("expected chain conflict, got {other:?}"),
    }
    assert!(err.is_retryable());

    let code = ledger.cast_vote(&request("V1", "C1", "President")).unwrap();
    let block = ledger.verify(code.as_str()).unwrap().block.unwrap();
    assert_eq!(block.block_number, BlockNumber::new(2));
    assert!(block.previous_hash.links_to(&rival_hash));
    assert!(ledger.audit_election(&e1(), AuditMode::FullChain).unwrap().valid());
}

#[test]
fn side_effect_failures_do_not_fail_the_cast() {
    let ledger = ledger();
    ledger.store().fail_at(FailPoint::VoterRegistry);
    ledger.store().fail_at(FailPoint::AuditLog);
    let code = ledger.cast_vote(&request("V1", "C1", "President")).unwrap();

    ledger.store().clear_failures();
    assert!(ledger.verify(code.as_str()).unwrap().verified);
    assert!(ledger
        .store()
        .voter_registry(&voter("V1"), &e1())
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// 4. Side tables
// ---------------------------------------------------------------------------

#[test]
fn cast_updates_registry_and_audit_log() {
    let ledger = ledger();
    let code = ledger.cast_vote(&request("V1", "C1", "President")).unwrap();
    let block = ledger.verify(code.as_str()).unwrap().block.unwrap();

    let entry = ledger
        .store()
        .voter_registry(&voter("V1"), &e1())
        .unwrap()
        .unwrap();
    assert!(entry.has_voted);
    assert_eq!(entry.voted_at, Some(block.timestamp));

    let log = ledger.store().audit_log(&e1()).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, AuditAction::VoteCast);
    assert_eq!(log[0].block_hash, Some(block.current_hash));
    assert_eq!(log[0].block_number, Some(block.block_number));
    assert_eq!(log[0].position, Some(position("President")));
}

#[test]
fn audit_run_is_logged_with_outcome() {
    let ledger = ledger();
    ledger.cast_vote(&request("V1", "C1", "President")).unwrap();
    ledger.cast_vote(&request("V2", "C1", "President")).unwrap();
    let audit = ledger.audit_election(&e1(), AuditMode::FullChain).unwrap();
    assert!(audit.valid());

    let log = ledger.store().audit_log(&e1()).unwrap();
    let entry = log.last().unwrap();
    assert_eq!(entry.action, AuditAction::ChainAudited);
    assert_eq!(entry.details["valid"], "true");
    assert_eq!(entry.details["mode"], "full");
    assert_eq!(entry.details["blocksChecked"], "2");
    assert_eq!(entry.block_number, Some(BlockNumber::new(2)));
}

#[test]
fn votes_for_orders_by_position_and_requires_a_voter() {
    let ledger = ledger();
    ledger.cast_vote(&request("V1", "C1", "Treasurer")).unwrap();
    ledger.cast_vote(&request("V2", "C1", "President")).unwrap();
    ledger.cast_vote(&request("V1", "C2", "President")).unwrap();

    let mine = ledger.votes_for(Some(&voter("V1")), &e1()).unwrap();
    let positions: Vec<_> = mine.iter().map(|b| b.position.as_str()).collect();
    assert_eq!(positions, ["President", "Treasurer"]);

    let voted = ledger.voted_positions(Some(&voter("V1")), &e1()).unwrap();
    assert!(voted.contains(&position("Treasurer")));
    assert_eq!(voted.len(), 2);

    assert!(matches!(
        ledger.votes_for(None, &e1()),
        Err(LedgerError::NotAuthenticated)
    ));
}

#[test]
fn stats_count_outcomes() {
    let ledger = ledger();
    let code = ledger.cast_vote(&request("V1", "C1", "President")).unwrap();
    let _ = ledger.cast_vote(&request("V1", "C1", "President"));
    ledger.verify(code.as_str()).unwrap();
    ledger.audit_election(&e1(), AuditMode::Window).unwrap();

    let stats = ledger.stats().unwrap();
    assert_eq!(stats.blocks, 1);
    assert_eq!(stats.counters["votes_cast"], 1);
    assert_eq!(stats.counters["duplicate_votes"], 1);
    assert_eq!(stats.counters["verifications"], 1);
    assert_eq!(stats.counters["audits"], 1);
}

// ---------------------------------------------------------------------------
// 5. Tamper detection
// ---------------------------------------------------------------------------

#[test]
fn tampered_candidate_is_flagged_but_still_returned() {
    let ledger = ledger();
    let code = ledger.cast_vote(&request("V1", "C1", "President")).unwrap();
    assert!(ledger.store().tamper(&code, |b| {
        b.candidate_id = CandidateId::parse("C2").unwrap()
    }));

    let result = ledger.verify(code.as_str()).unwrap();
    assert!(!result.verified);
    assert_eq!(result.outcome, VerificationOutcome::HashMismatch);
    assert_eq!(result.block.unwrap().candidate_id.as_str(), "C2");

    let audit = ledger.audit_election(&e1(), AuditMode::FullChain).unwrap();
    assert_eq!(audit.first_invalid_block_number(), Some(BlockNumber::FIRST));
    assert_eq!(audit.first_break.unwrap().kind, BreakKind::HashMismatch);
}

#[test]
fn broken_link_in_three_block_chain() {
    let ledger = ledger();
    ledger.cast_vote(&request("V1", "C1", "President")).unwrap();
    let second: VerificationCode = ledger.cast_vote(&request("V2", "C1", "President")).unwrap();
    ledger.cast_vote(&request("V3", "C2", "President")).unwrap();

    ledger.store().tamper(&second, |b| {
        b.previous_hash = PreviousHash::Block(VoteHash::new([0x11; 32]))
    });

    let audit = ledger.audit_election(&e1(), AuditMode::FullChain).unwrap();
    assert!(!audit.valid());
    assert_eq!(audit.first_invalid_block_number(), Some(BlockNumber::new(2)));
    assert_eq!(audit.first_break.unwrap().kind, BreakKind::BrokenLink);

    let again = ledger.audit_election(&e1(), AuditMode::FullChain).unwrap();
    assert_eq!(audit, again);
}

// ---------------------------------------------------------------------------
// 6. Concurrency
// ---------------------------------------------------------------------------

/// Cast, retrying retryable failures the way a caller is expected to.
fn cast_with_retry<S, C, R, E>(
    ledger: &VoteLedger<S, C, R, E>,
    req: &CastRequest,
) -> Result<VerificationCode, CastError>
where
    S: ballotchain_store::LedgerStore,
    C: ballotchain_types::Clock,
    R: ballotchain_crypto::RandomSource,
    E: ballotchain_ledger::ElectionSchedule,
{
    loop {
        match ledger.cast_vote(req) {
            Err(e) if e.is_retryable() => continue,
            other => return other,
        }
    }
}

#[test]
fn concurrent_voters_form_one_valid_chain() {
    let ledger = Arc::new(VoteLedger::with_sources(
        NullStore::new(),
        calendar(),
        SystemClock,
        OsRandom,
    ));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                for i in 0..5 {
                    let req = request(&format!("V{t}-{i}"), "C1", "President");
                    cast_with_retry(&*ledger, &req).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let blocks = ledger.store().all_blocks();
    assert_eq!(blocks.len(), 40);
    let numbers: Vec<u64> = blocks.iter().map(|b| b.block_number.get()).collect();
    assert_eq!(numbers, (1..=40).collect::<Vec<_>>());
    assert!(ledger.audit_election(&e1(), AuditMode::FullChain).unwrap().valid());
}

#[test]
fn concurrent_duplicates_record_exactly_one_vote() {
    let ledger = Arc::new(VoteLedger::with_sources(
        NullStore::new(),
        calendar(),
        SystemClock,
        OsRandom,
    ));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                cast_with_retry(&*ledger, &request("V1", &format!("C{t}"), "President"))
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, CastError::DuplicateVote { .. })));
    assert_eq!(ledger.store().blocks_for_voter(&voter("V1"), &e1()).unwrap().len(), 1);
}
