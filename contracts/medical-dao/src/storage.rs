use soroban_sdk::{contracttype, Address, Env, String, Vec};

use crate::roles::Role;
use crate::Error;

pub const PERSISTENT_BUMP_LEDGERS: u32 = 518_400;

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Config,                      // -> Config
    NextProposalId,              // -> u64
    Proposal(u64),               // -> Proposal
    Contributed(Address),        // -> i128
    StakeholderBalance(Address), // -> i128
    VotesCast(Address),          // -> Vec<u64>
    Voted(u64, Address),         // (proposal_id, voter) -> bool
    Role(Role, Address),         // -> bool
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub admin: Address,
    pub token: Address,
    /// Cumulative contribution at which a contributor becomes a stakeholder.
    pub stakeholder_threshold: i128,
    /// Seconds a proposal stays open for voting.
    pub voting_period: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Proposal {
    pub id: u64,
    pub amount: i128,
    pub live_period: u64, // ledger timestamp at which voting closes
    pub votes_for: u32,
    pub votes_against: u32,
    pub description: String,
    pub voting_passed: bool,
    pub paid: bool,
    pub medical_address: Address,
    pub proposer: Address,
    pub paid_by: Option<Address>,
}

impl Proposal {
    pub fn voting_expired(&self, now: u64) -> bool {
        self.voting_passed || now >= self.live_period
    }

    pub fn quorum_met(&self) -> bool {
        self.votes_for > self.votes_against
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

pub fn has_config(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

pub fn get_config(env: &Env) -> Result<Config, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(Error::NotInitialized)
}

pub fn set_config(env: &Env, config: &Config) {
    env.storage().instance().set(&DataKey::Config, config);
}

// ---------------------------------------------------------------------------
// Proposals
// ---------------------------------------------------------------------------

pub fn next_proposal_id(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::NextProposalId)
        .unwrap_or(0)
}

pub fn set_next_proposal_id(env: &Env, id: u64) {
    env.storage().instance().set(&DataKey::NextProposalId, &id);
}

pub fn get_proposal(env: &Env, proposal_id: u64) -> Result<Proposal, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::Proposal(proposal_id))
        .ok_or(Error::NotFound)
}

pub fn set_proposal(env: &Env, proposal: &Proposal) {
    let key = DataKey::Proposal(proposal.id);
    env.storage().persistent().set(&key, proposal);
    extend_persistent_ttl(env, &key);
}

// ---------------------------------------------------------------------------
// Accounting
// ---------------------------------------------------------------------------

pub fn get_contributed(env: &Env, who: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::Contributed(who.clone()))
        .unwrap_or(0)
}

pub fn get_stakeholder_balance(env: &Env, who: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::StakeholderBalance(who.clone()))
        .unwrap_or(0)
}

pub fn set_contributed(env: &Env, who: &Address, value: i128) {
    set_i128(env, DataKey::Contributed(who.clone()), value);
}

pub fn set_stakeholder_balance(env: &Env, who: &Address, value: i128) {
    set_i128(env, DataKey::StakeholderBalance(who.clone()), value);
}

// ---------------------------------------------------------------------------
// Votes
// ---------------------------------------------------------------------------

pub fn has_voted(env: &Env, proposal_id: u64, voter: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::Voted(proposal_id, voter.clone()))
}

pub fn get_votes_cast(env: &Env, voter: &Address) -> Vec<u64> {
    env.storage()
        .persistent()
        .get(&DataKey::VotesCast(voter.clone()))
        .unwrap_or_else(|| Vec::new(env))
}

/// Records that `voter` has voted on `proposal_id`. Entries are never removed.
pub fn record_vote(env: &Env, proposal_id: u64, voter: &Address) {
    let voted_key = DataKey::Voted(proposal_id, voter.clone());
    env.storage().persistent().set(&voted_key, &true);
    extend_persistent_ttl(env, &voted_key);

    let mut cast = get_votes_cast(env, voter);
    cast.push_back(proposal_id);
    let cast_key = DataKey::VotesCast(voter.clone());
    env.storage().persistent().set(&cast_key, &cast);
    extend_persistent_ttl(env, &cast_key);
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn set_i128(env: &Env, key: DataKey, value: i128) {
    env.storage().persistent().set(&key, &value);
    extend_persistent_ttl(env, &key);
}

pub fn extend_persistent_ttl(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_BUMP_LEDGERS, PERSISTENT_BUMP_LEDGERS);
}
