//! Medical DAO Contract
//!
//! A community treasury that pays medical bills. Anyone may contribute to the
//! pool; contributors whose cumulative contribution reaches the stakeholder
//! threshold become stakeholders. Stakeholders propose disbursements to a
//! medical destination, vote on them, and release funds for proposals that
//! carry a simple majority.
//!
//! ## Flow
//! 1. Contributor calls `contribute`; funds move into the contract and the
//!    contributor is promoted to stakeholder once the threshold is crossed
//! 2. Stakeholder calls `create_proposal` with a description, destination and
//!    amount; voting stays open for `voting_period` seconds
//! 3. Stakeholders call `vote` once each per proposal
//! 4. Any stakeholder calls `pay_medical` once `votes_for > votes_against`
//!
//! ## Security Model
//! - Only stakeholders may propose, vote or pay
//! - One vote per stakeholder per proposal
//! - A proposal is marked paid before the outbound transfer and restored if
//!   the transfer fails, so funds leave the pool at most once per proposal
//! - Ties never pay
#![no_std]
#![allow(unexpected_cfgs)]

mod events;
mod roles;
mod storage;

use soroban_sdk::{
    contract, contracterror, contractimpl, token::TokenClient, Address, Env, String, Vec,
};

pub use roles::Role;
pub use storage::{Config, Proposal};

/// 0.05 XLM in stroops.
pub const DEFAULT_STAKEHOLDER_THRESHOLD: i128 = 500_000;
/// One day in seconds.
pub const DEFAULT_VOTING_PERIOD: u64 = 86_400;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    NotInitialized     = 2,
    Unauthorized       = 3,
    InvalidAmount      = 4,
    InvalidConfig      = 5,
    NotFound           = 6,
    VotingClosed       = 7,
    VotingOpen         = 8,
    AlreadyVoted       = 9,
    AlreadyPaid        = 10,
    QuorumNotMet       = 11,
    TransferFailed     = 12,
    Overflow           = 13,
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[contract]
pub struct MedicalDao;

#[contractimpl]
impl MedicalDao {
    /// Initialize the DAO with its pool token and parameters.
    ///
    /// `stakeholder_threshold`: cumulative contribution that promotes a
    /// contributor (e.g. `DEFAULT_STAKEHOLDER_THRESHOLD`)
    /// `voting_period`: seconds a proposal accepts votes (e.g. `DEFAULT_VOTING_PERIOD`)
    pub fn init(
        env: Env,
        admin: Address,
        token: Address,
        stakeholder_threshold: i128,
        voting_period: u64,
    ) -> Result<(), Error> {
        if storage::has_config(&env) {
            return Err(Error::AlreadyInitialized);
        }
        admin.require_auth();

        if stakeholder_threshold <= 0 || voting_period == 0 {
            return Err(Error::InvalidConfig);
        }

        storage::set_config(
            &env,
            &Config {
                admin: admin.clone(),
                token: token.clone(),
                stakeholder_threshold,
                voting_period,
            },
        );
        storage::set_next_proposal_id(&env, 0);

        events::Initialized { admin, token }.publish(&env);

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Contributions
    // -----------------------------------------------------------------------

    /// Contribute `amount` of the pool token.
    ///
    /// The first contribution makes the caller a contributor. Crossing the
    /// stakeholder threshold promotes them, seeding their stakeholder balance
    /// with the full cumulative amount. Stakeholders keep accruing both
    /// balances on every later contribution.
    pub fn contribute(env: Env, contributor: Address, amount: i128) -> Result<(), Error> {
        let config = storage::get_config(&env)?;
        contributor.require_auth();

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let contract_address = env.current_contract_address();
        TokenClient::new(&env, &config.token).transfer(&contributor, &contract_address, &amount);

        let contributed = storage::get_contributed(&env, &contributor)
            .checked_add(amount)
            .ok_or(Error::Overflow)?;

        if roles::has_role(&env, &contributor, Role::Stakeholder) {
            let balance = storage::get_stakeholder_balance(&env, &contributor)
                .checked_add(amount)
                .ok_or(Error::Overflow)?;
            storage::set_stakeholder_balance(&env, &contributor, balance);
        } else if contributed >= config.stakeholder_threshold {
            roles::grant_role(&env, &contributor, Role::Stakeholder);
            roles::grant_role(&env, &contributor, Role::Contributor);
            storage::set_stakeholder_balance(&env, &contributor, contributed);
        } else {
            roles::grant_role(&env, &contributor, Role::Contributor);
        }
        storage::set_contributed(&env, &contributor, contributed);

        events::ContributionReceived {
            contributor,
            amount,
        }
        .publish(&env);

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Proposals
    // -----------------------------------------------------------------------

    /// Create a new proposal. Stakeholders only.
    ///
    /// Amount and destination are taken as given; returns the new proposal id.
    pub fn create_proposal(
        env: Env,
        proposer: Address,
        description: String,
        medical_address: Address,
        amount: i128,
    ) -> Result<u64, Error> {
        let config = storage::get_config(&env)?;
        proposer.require_auth();
        roles::require_role(&env, &proposer, Role::Stakeholder)?;

        let proposal_id = storage::next_proposal_id(&env);
        let live_period = env
            .ledger()
            .timestamp()
            .checked_add(config.voting_period)
            .ok_or(Error::Overflow)?;

        let proposal = Proposal {
            id: proposal_id,
            amount,
            live_period,
            votes_for: 0,
            votes_against: 0,
            description,
            voting_passed: false,
            paid: false,
            medical_address,
            proposer: proposer.clone(),
            paid_by: None,
        };

        storage::set_proposal(&env, &proposal);
        storage::set_next_proposal_id(
            &env,
            proposal_id.checked_add(1).ok_or(Error::Overflow)?,
        );

        events::ProposalCreated {
            proposal_id,
            proposer,
            amount,
        }
        .publish(&env);

        Ok(proposal_id)
    }

    /// Get proposal details
    pub fn get_proposal(env: Env, proposal_id: u64) -> Result<Proposal, Error> {
        let proposal = storage::get_proposal(&env, proposal_id)?;
        Ok(with_expiry(&env, proposal))
    }

    /// All proposals in creation order. Ids are never deleted, so a missing
    /// record below the counter surfaces as `NotFound`.
    pub fn list_proposals(env: Env) -> Result<Vec<Proposal>, Error> {
        let mut proposals = Vec::new(&env);
        for proposal_id in 0..storage::next_proposal_id(&env) {
            let proposal = storage::get_proposal(&env, proposal_id)?;
            proposals.push_back(with_expiry(&env, proposal));
        }
        Ok(proposals)
    }

    /// Number of proposals ever created; also the next id to be assigned.
    pub fn proposal_count(env: Env) -> u64 {
        storage::next_proposal_id(&env)
    }

    // -----------------------------------------------------------------------
    // Voting
    // -----------------------------------------------------------------------

    /// Cast a vote on an open proposal. Stakeholders only.
    ///
    /// `support`: true = for, false = against
    pub fn vote(env: Env, voter: Address, proposal_id: u64, support: bool) -> Result<(), Error> {
        require_initialized(&env)?;
        voter.require_auth();
        roles::require_role(&env, &voter, Role::Stakeholder)?;

        let mut proposal = storage::get_proposal(&env, proposal_id)?;

        if proposal.voting_expired(env.ledger().timestamp()) {
            return Err(Error::VotingClosed);
        }

        if storage::has_voted(&env, proposal_id, &voter) {
            return Err(Error::AlreadyVoted);
        }

        if support {
            proposal.votes_for = proposal.votes_for.checked_add(1).ok_or(Error::Overflow)?;
        } else {
            proposal.votes_against = proposal
                .votes_against
                .checked_add(1)
                .ok_or(Error::Overflow)?;
        }

        storage::set_proposal(&env, &proposal);
        storage::record_vote(&env, proposal_id, &voter);

        events::VoteCast {
            proposal_id,
            voter,
            support,
        }
        .publish(&env);

        Ok(())
    }

    /// Persist the closed state of a proposal whose voting window has elapsed.
    /// Anyone can call; repeated calls are no-ops.
    pub fn close_voting(env: Env, proposal_id: u64) -> Result<(), Error> {
        require_initialized(&env)?;

        let mut proposal = storage::get_proposal(&env, proposal_id)?;
        if proposal.voting_passed {
            return Ok(());
        }

        if env.ledger().timestamp() < proposal.live_period {
            return Err(Error::VotingOpen);
        }

        proposal.voting_passed = true;
        storage::set_proposal(&env, &proposal);

        events::VotingClosed { proposal_id }.publish(&env);

        Ok(())
    }

    /// Proposal ids `stakeholder` has voted on, in vote order. Stakeholders only.
    pub fn list_votes_cast(env: Env, stakeholder: Address) -> Result<Vec<u64>, Error> {
        require_initialized(&env)?;
        roles::require_role(&env, &stakeholder, Role::Stakeholder)?;
        Ok(storage::get_votes_cast(&env, &stakeholder))
    }

    /// Check if an address has voted on a proposal
    pub fn has_voted(env: Env, proposal_id: u64, voter: Address) -> bool {
        storage::has_voted(&env, proposal_id, &voter)
    }

    // -----------------------------------------------------------------------
    // Disbursement
    // -----------------------------------------------------------------------

    /// Release a proposal's amount to its medical address. Stakeholders only.
    ///
    /// Requires `votes_for > votes_against`. The proposal is stored as paid
    /// before the token transfer; if the transfer fails the stored record is
    /// put back and `TransferFailed` is returned.
    pub fn pay_medical(env: Env, payer: Address, proposal_id: u64) -> Result<(), Error> {
        let config = storage::get_config(&env)?;
        payer.require_auth();
        roles::require_role(&env, &payer, Role::Stakeholder)?;

        let stored = storage::get_proposal(&env, proposal_id)?;

        if stored.paid {
            return Err(Error::AlreadyPaid);
        }

        if !stored.quorum_met() {
            return Err(Error::QuorumNotMet);
        }

        let mut proposal = with_expiry(&env, stored.clone());
        proposal.paid = true;
        proposal.paid_by = Some(payer.clone());
        storage::set_proposal(&env, &proposal);

        let contract_address = env.current_contract_address();
        let transfer = TokenClient::new(&env, &config.token).try_transfer(
            &contract_address,
            &proposal.medical_address,
            &proposal.amount,
        );
        if !matches!(transfer, Ok(Ok(()))) {
            storage::set_proposal(&env, &stored);
            return Err(Error::TransferFailed);
        }

        events::PaymentTransferred {
            proposal_id,
            payer,
            medical_address: proposal.medical_address,
            amount: proposal.amount,
        }
        .publish(&env);

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Balances and roles
    // -----------------------------------------------------------------------

    /// Amount contributed since promotion, including the promoting total.
    /// Stakeholders only.
    pub fn stakeholder_balance(env: Env, stakeholder: Address) -> Result<i128, Error> {
        require_initialized(&env)?;
        roles::require_role(&env, &stakeholder, Role::Stakeholder)?;
        Ok(storage::get_stakeholder_balance(&env, &stakeholder))
    }

    /// Cumulative amount ever contributed. Contributors only.
    pub fn contributor_balance(env: Env, contributor: Address) -> Result<i128, Error> {
        require_initialized(&env)?;
        roles::require_role(&env, &contributor, Role::Contributor)?;
        Ok(storage::get_contributed(&env, &contributor))
    }

    /// Check if an address holds the stakeholder role
    pub fn is_stakeholder(env: Env, address: Address) -> bool {
        roles::has_role(&env, &address, Role::Stakeholder)
    }

    /// Check if an address holds the contributor role
    pub fn is_contributor(env: Env, address: Address) -> bool {
        roles::has_role(&env, &address, Role::Contributor)
    }

    /// Pool token held by the contract.
    pub fn treasury_balance(env: Env) -> Result<i128, Error> {
        let config = storage::get_config(&env)?;
        Ok(TokenClient::new(&env, &config.token).balance(&env.current_contract_address()))
    }

    /// Get the parameters set at initialization
    pub fn config(env: Env) -> Result<Config, Error> {
        storage::get_config(&env)
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn require_initialized(env: &Env) -> Result<(), Error> {
    if !storage::has_config(env) {
        return Err(Error::NotInitialized);
    }
    Ok(())
}

/// Expiry is evaluated lazily: a proposal past its live period reads as
/// closed whether or not the flag has been persisted yet.
fn with_expiry(env: &Env, mut proposal: Proposal) -> Proposal {
    if proposal.voting_expired(env.ledger().timestamp()) {
        proposal.voting_passed = true;
    }
    proposal
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
