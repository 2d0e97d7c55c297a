//! End-to-end mix lifecycles driven through the full event pipeline,
//! block by block, the way a host transaction pass would.

use veil_core::{AccountId, Holding, MixEvent, MixId, Stage, Submission};
use veil_state::{
    expire_mixes, process_submission, BlockDuplicates, EntryDirection, ExecutionContext,
    LedgerState, ProtocolConfig, RejectionClass, StateError, StateReader,
};

const AMOUNT: u64 = 100;
const DEPOSIT: u64 = 10;

fn account(n: u8) -> AccountId {
    [n; 20]
}

fn ctx() -> ExecutionContext {
    ExecutionContext::with_config(100, ProtocolConfig::devnet())
}

/// A recipient-bearing opaque blob: account in the first 20 bytes.
fn blob(recipient: u8) -> Vec<u8> {
    let mut b = vec![0u8; 40];
    b[..20].copy_from_slice(&account(recipient));
    b
}

/// Apply one submission in its own block.
fn apply(state: &mut LedgerState, submission: &Submission) -> Result<bool, StateError> {
    let mut dups = BlockDuplicates::new();
    process_submission(state, &ctx(), &mut dups, submission)
}

fn create_mix(state: &mut LedgerState, issuer: u8, holding: Holding) -> MixId {
    let submission = Submission::new(
        account(issuer),
        MixEvent::Create {
            holding,
            amount: AMOUNT,
            participant_count: 3,
            cancellation_height: 500,
        },
    );
    assert!(apply(state, &submission).unwrap());
    submission.derived_id()
}

fn register(state: &mut LedgerState, n: u8, mix_id: MixId) {
    let submission = Submission::new(account(n), MixEvent::Register { mix_id });
    assert!(apply(state, &submission).unwrap());
}

fn relay(
    state: &mut LedgerState,
    n: u8,
    mix_id: MixId,
    previous_hash: Option<[u8; 32]>,
    data: Vec<Vec<u8>>,
) -> [u8; 32] {
    let submission = Submission::new(
        account(n),
        MixEvent::Relay { mix_id, previous_hash, data },
    );
    assert!(apply(state, &submission).unwrap());
    submission.full_hash()
}

/// Net journal delta for one mix: credits minus debits, across all
/// accounts and holdings. Zero once the mix is terminal.
fn journal_net(state: &LedgerState, mix_id: &MixId) -> i128 {
    state
        .entries_for(mix_id)
        .iter()
        .map(|e| match e.direction {
            EntryDirection::Credit => e.amount as i128,
            EntryDirection::Debit => -(e.amount as i128),
        })
        .sum()
}

#[test]
fn happy_path_native_coin() {
    let mut state = LedgerState::new();
    for n in 0..=3 {
        state.set_balance(account(n), Holding::Coin, 1_000);
    }

    // Creator reserves one amount at creation.
    let mix_id = create_mix(&mut state, 0, Holding::Coin);
    assert_eq!(state.balance(&account(0), &Holding::Coin), 900);

    // Three registrations each reserve one amount; the third fills the
    // mix and starts processing.
    for n in 1..=3 {
        register(&mut state, n, mix_id);
        assert_eq!(state.balance(&account(n), &Holding::Coin), 900);
    }
    assert_eq!(state.get_mix(&mix_id).unwrap().stage, Stage::Processing);

    // A fourth registration now fails statefully, not structurally.
    let late = Submission::new(account(4), MixEvent::Register { mix_id });
    let err = apply(&mut state, &late).unwrap_err();
    assert!(matches!(err, StateError::WrongStage { .. }));
    assert_eq!(err.class(), RejectionClass::NotCurrentlyValid);

    // Index 0 relays 1 blob, index 1 relays 2 chaining index 0's hash,
    // index 2 relays 3 and flips the mix to verification.
    let h1 = relay(&mut state, 1, mix_id, None, vec![blob(10)]);
    assert_eq!(state.get_mix(&mix_id).unwrap().assignee_index, 1);
    let h2 = relay(&mut state, 2, mix_id, Some(h1), vec![blob(10), blob(11)]);
    let final_hash = relay(&mut state, 3, mix_id, Some(h2), vec![blob(10), blob(11), blob(12)]);
    assert_eq!(state.get_mix(&mix_id).unwrap().stage, Stage::Verification);

    // All three verify against the last relay's hash.
    for n in 1..=3 {
        let submission = Submission::new(account(n), MixEvent::Verify { mix_id, final_hash });
        assert!(apply(&mut state, &submission).unwrap());
    }

    let mix = state.get_mix(&mix_id).unwrap().clone();
    assert_eq!(mix.stage, Stage::Done);

    // Payout follows the final relay's output list, not participant
    // indices: accounts 10-12 each receive one amount.
    for n in 10..=12 {
        assert_eq!(state.balance(&account(n), &Holding::Coin), AMOUNT);
    }
    // The creator's escrow is returned in full.
    assert_eq!(state.balance(&account(0), &Holding::Coin), 1_000);

    // Conservation: credited payouts equal the reservations taken at
    // creation and registration.
    assert_eq!(journal_net(&state, &mix_id), 0);
    let total: u64 = (0..=12u8)
        .map(|n| state.balances.get(&(account(n), Holding::Coin)).copied().unwrap_or(0))
        .sum();
    assert_eq!(total, 4_000);
}

#[test]
fn blame_path_refunds_everyone() {
    let mut state = LedgerState::new();
    let asset_id = [0xEE; 20];
    let holding = Holding::Asset(asset_id);
    state.add_asset(asset_id, veil_core::Asset { total_supply: 10_000 });
    for n in 0..=3 {
        state.set_balance(account(n), holding, 500);
        state.set_balance(account(n), Holding::Coin, 50);
    }

    let mix_id = create_mix(&mut state, 0, holding);
    for n in 1..=3 {
        register(&mut state, n, mix_id);
    }

    // Non-native holdings lock the amount plus the coin deposit.
    for n in 0..=3 {
        assert_eq!(state.balance(&account(n), &holding), 400);
        assert_eq!(state.balance(&account(n), &Holding::Coin), 50 - DEPOSIT);
    }

    // Index 0 relays, then index 1 cancels instead of relaying,
    // revealing one seed (count - index - 1 = 1). The mix enters Blame.
    relay(&mut state, 1, mix_id, None, vec![blob(10)]);
    let cancel1 = Submission::new(
        account(2),
        MixEvent::Cancel {
            mix_id,
            cancelling_account: None,
            commitment: None,
            key_seeds: vec![vec![7u8; 32]],
        },
    );
    assert!(apply(&mut state, &cancel1).unwrap());
    let mix = state.get_mix(&mix_id).unwrap();
    assert_eq!(mix.stage, Stage::Blame);
    assert_eq!(mix.canceller, Some(account(2)));

    // A malformed seed reveal stays rejected even in Blame: the last
    // index has nobody after it, so any non-empty reveal is the wrong
    // count, and a permanent rejection.
    let bad = Submission::new(
        account(3),
        MixEvent::Cancel {
            mix_id,
            cancelling_account: None,
            commitment: None,
            key_seeds: vec![vec![7u8; 32]],
        },
    );
    let err = apply(&mut state, &bad).unwrap_err();
    assert!(matches!(err, StateError::InvalidKeySeedCount { provided: 1, expected: 0 }));
    assert_eq!(err.class(), RejectionClass::NotValid);

    // The remaining participants resolve; index 2 opts out of revealing,
    // index 0 disputes its own relay submission.
    let cancel2 = Submission::new(
        account(3),
        MixEvent::Cancel {
            mix_id,
            cancelling_account: Some(account(2)),
            commitment: None,
            key_seeds: vec![],
        },
    );
    assert!(apply(&mut state, &cancel2).unwrap());

    let commitment = state
        .get_participant(&mix_id, &account(1))
        .unwrap()
        .commitment;
    let cancel3 = Submission::new(
        account(1),
        MixEvent::Cancel {
            mix_id,
            cancelling_account: None,
            commitment,
            key_seeds: vec![vec![1u8; 32], vec![2u8; 32]],
        },
    );
    assert!(apply(&mut state, &cancel3).unwrap());

    // All participants terminal: cancelled, and every reservation —
    // amounts and deposits, creator included — is back where it started.
    assert_eq!(state.get_mix(&mix_id).unwrap().stage, Stage::Cancelled);
    for n in 0..=3 {
        assert_eq!(state.balance(&account(n), &holding), 500);
        assert_eq!(state.balance(&account(n), &Holding::Coin), 50);
    }
    assert_eq!(journal_net(&state, &mix_id), 0);
}

#[test]
fn registration_deadline_sweep() {
    let mut state = LedgerState::new();
    for n in 0..=1 {
        state.set_balance(account(n), Holding::Coin, 1_000);
    }

    let mix_id = create_mix(&mut state, 0, Holding::Coin);
    register(&mut state, 1, mix_id);
    assert_eq!(state.balance(&account(0), &Holding::Coin), 900);
    assert_eq!(state.balance(&account(1), &Holding::Coin), 900);

    // Height advances past the cancellation deadline with registration
    // incomplete; the sweep cancels and refunds.
    let later = ctx().at_height(500);
    assert_eq!(expire_mixes(&mut state, &later), 1);
    assert_eq!(state.get_mix(&mix_id).unwrap().stage, Stage::Cancelled);
    assert_eq!(state.balance(&account(0), &Holding::Coin), 1_000);
    assert_eq!(state.balance(&account(1), &Holding::Coin), 1_000);

    // Running the sweep again changes nothing.
    assert_eq!(expire_mixes(&mut state, &later.at_height(501)), 0);
    assert_eq!(state.balance(&account(1), &Holding::Coin), 1_000);
    assert_eq!(journal_net(&state, &mix_id), 0);
}

#[test]
fn terminal_mix_rejects_further_events() {
    let mut state = LedgerState::new();
    for n in 0..=3 {
        state.set_balance(account(n), Holding::Coin, 1_000);
    }

    let mix_id = create_mix(&mut state, 0, Holding::Coin);
    for n in 1..=3 {
        register(&mut state, n, mix_id);
    }
    let h1 = relay(&mut state, 1, mix_id, None, vec![blob(10)]);
    let h2 = relay(&mut state, 2, mix_id, Some(h1), vec![blob(10), blob(11)]);
    let final_hash = relay(&mut state, 3, mix_id, Some(h2), vec![blob(10), blob(11), blob(12)]);
    for n in 1..=3 {
        let submission = Submission::new(account(n), MixEvent::Verify { mix_id, final_hash });
        assert!(apply(&mut state, &submission).unwrap());
    }
    assert_eq!(state.get_mix(&mix_id).unwrap().stage, Stage::Done);

    // A Done mix accepts neither verification nor cancellation.
    let verify = Submission::new(account(1), MixEvent::Verify { mix_id, final_hash });
    assert!(matches!(
        apply(&mut state, &verify),
        Err(StateError::WrongStage { .. })
    ));
    let cancel = Submission::new(
        account(1),
        MixEvent::Cancel {
            mix_id,
            cancelling_account: None,
            commitment: None,
            key_seeds: vec![],
        },
    );
    assert!(matches!(
        apply(&mut state, &cancel),
        Err(StateError::WrongStage { .. })
    ));
}
