//! Listings, bids and counter-offers inside transfer windows.
//!
//! Every command checks all of its preconditions before it changes anything.
//! Money moves through [`FinanceEngine::transfer_funds`], which is itself
//! all-or-nothing, and the roster move that follows cannot fail.

use serde::{Deserialize, Serialize};

use super::types::{
    BidParty, BidStatus, CompletedTransfer, ListingStatus, TransferWindow, WindowKind,
};
use crate::config::{AcceptancePolicy, TransferConfig};
use crate::error::{BusinessRuleViolation, Result, ValidationError};
use crate::finance::FinanceEngine;
use crate::models::{BidId, ListingId, Player, PlayerId, TeamId};
use crate::season::SeasonState;

/// Estimated values never drop below this.
pub const MIN_MARKET_VALUE: i64 = 100_000;
pub const VALUE_PER_GOAL: i64 = 200_000;

/// Market value adjusted for age, this season's goals and contract length.
pub fn estimate_value(player: &Player, season_year: u16) -> i64 {
    let age_factor = match player.age {
        0..=21 => 1.2,
        22..=29 => 1.0,
        30..=32 => 0.7,
        _ => 0.4,
    };
    let mut value = player.market_value as f64 * age_factor;
    value += player.season.goals as f64 * VALUE_PER_GOAL as f64;

    let years_left = player.contract.expires_season as i32 - season_year as i32;
    if years_left <= 1 {
        value *= 0.5;
    } else if years_left <= 2 {
        value *= 0.75;
    }
    // Free agents cost a signing bonus only.
    if player.is_free_agent() {
        value *= 0.2;
    }
    (value.round() as i64).max(MIN_MARKET_VALUE)
}

/// What closing a window expired.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WindowClosure {
    pub expired_listings: Vec<ListingId>,
    pub expired_bids: Vec<BidId>,
}

#[derive(Debug, Clone, Default)]
pub struct TransferMarket {
    config: TransferConfig,
    season_year: u16,
}

impl TransferMarket {
    pub fn new(config: TransferConfig, season_year: u16) -> Self {
        Self { config, season_year }
    }

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    // ========================================================================
    // Windows
    // ========================================================================

    /// Opens a window for `length` matchdays. Leftovers of the previous
    /// window are cleared. Opening an open window does nothing.
    pub fn open_window(&self, state: &mut SeasonState, kind: WindowKind, length: u16) {
        if state.market.is_window_open() {
            return;
        }
        let opened_after = state.current_matchday;
        let closes_after = opened_after.saturating_add(length);
        state.market.purge_closed();
        state.market.set_window(Some(TransferWindow { kind, opened_after, closes_after }));
        log::info!("{:?} transfer window open until matchday {}", kind, closes_after);
    }

    /// Closes the window. Every listing and bid still open expires.
    pub fn close_window(&self, state: &mut SeasonState) -> WindowClosure {
        let Some(window) = state.market.window() else {
            return WindowClosure::default();
        };
        let (expired_listings, expired_bids) = state.market.expire_open();
        state.market.set_window(None);
        log::info!(
            "{:?} transfer window closed: {} listings and {} bids expired",
            window.kind,
            expired_listings.len(),
            expired_bids.len()
        );
        WindowClosure { expired_listings, expired_bids }
    }

    // ========================================================================
    // Listings
    // ========================================================================

    pub fn create_listing(
        &self,
        state: &mut SeasonState,
        seller: TeamId,
        player: PlayerId,
        asking_price: i64,
    ) -> Result<ListingId> {
        ensure_window(state)?;
        if asking_price <= 0 {
            return Err(ValidationError::NonPositivePrice(asking_price).into());
        }
        state.team(seller)?;
        let owner = state.player(player)?.team;
        if owner != Some(seller) {
            return Err(ValidationError::OwnershipMismatch { player, claimed: seller, owner }.into());
        }
        if state.market.active_listing_for(player).is_some() {
            return Err(BusinessRuleViolation::AlreadyListed(player).into());
        }

        let id = state.market.insert_listing(player, seller, asking_price, state.current_matchday);
        log::debug!("Listing {}: {} offered by {} at {}", id, player, seller, asking_price);
        Ok(id)
    }

    /// Takes a listing off the market. Pending bids on it are rejected.
    pub fn withdraw_listing(&self, state: &mut SeasonState, seller: TeamId, listing: ListingId) -> Result<()> {
        let current = state.market.listing(listing)?;
        if current.seller != seller {
            return Err(BusinessRuleViolation::NotSeller { listing, team: seller }.into());
        }
        ensure_active(listing, current.status)?;

        state.market.listing_mut(listing)?.status = ListingStatus::Withdrawn;
        state.market.settle_pending(listing, BidStatus::Rejected);
        Ok(())
    }

    // ========================================================================
    // Bids
    // ========================================================================

    pub fn place_bid(
        &self,
        state: &mut SeasonState,
        finance: &FinanceEngine,
        buyer: TeamId,
        listing: ListingId,
        amount: i64,
    ) -> Result<BidId> {
        ensure_window(state)?;
        if amount <= 0 {
            return Err(ValidationError::NonPositivePrice(amount).into());
        }
        let target = state.market.listing(listing)?;
        ensure_active(listing, target.status)?;
        if target.seller == buyer {
            return Err(BusinessRuleViolation::SelfBid(buyer).into());
        }
        self.ensure_room(state, buyer)?;
        finance.ensure_can_spend(&state.accounts, buyer, amount)?;

        let id = state.market.insert_bid(listing, buyer, amount, BidParty::Buyer, None, state.current_matchday);
        let target = state.market.listing_mut(listing)?;
        if target.status == ListingStatus::Open {
            target.status = ListingStatus::UnderNegotiation;
        }
        log::debug!("Bid {}: {} offers {} on listing {}", id, buyer, amount, listing);
        Ok(id)
    }

    /// Answers a pending bid with a new amount. The counter goes back to the
    /// other side as a fresh pending bid.
    pub fn counter_bid(
        &self,
        state: &mut SeasonState,
        finance: &FinanceEngine,
        acting: TeamId,
        bid: BidId,
        amount: i64,
    ) -> Result<BidId> {
        ensure_window(state)?;
        if amount <= 0 {
            return Err(ValidationError::NonPositivePrice(amount).into());
        }
        let (listing, buyer, proposer) = self.ensure_counterparty(state, acting, bid)?;
        let proposer = proposer.other();
        if proposer == BidParty::Buyer {
            finance.ensure_can_spend(&state.accounts, buyer, amount)?;
        }

        state.market.bid_mut(bid)?.status = BidStatus::Countered;
        let id = state.market.insert_bid(listing, buyer, amount, proposer, Some(bid), state.current_matchday);
        log::debug!("Bid {} countered by {} with {} at {}", bid, acting, id, amount);
        Ok(id)
    }

    pub fn reject_bid(&self, state: &mut SeasonState, acting: TeamId, bid: BidId) -> Result<()> {
        self.ensure_counterparty(state, acting, bid)?;
        state.market.bid_mut(bid)?.status = BidStatus::Rejected;
        Ok(())
    }

    /// Accepts a pending bid and completes the transfer. Under
    /// [`AcceptancePolicy::AskingPriceOnly`] a seller cannot accept a buyer's
    /// offer below the asking price.
    pub fn accept_bid(
        &self,
        state: &mut SeasonState,
        finance: &FinanceEngine,
        acting: TeamId,
        bid: BidId,
    ) -> Result<CompletedTransfer> {
        ensure_window(state)?;
        let (listing, _, proposer) = self.ensure_counterparty(state, acting, bid)?;
        let asking = state.market.listing(listing)?.asking_price;
        let amount = state.market.bid(bid)?.amount;
        if proposer == BidParty::Buyer
            && amount < asking
            && self.config.acceptance_policy == AcceptancePolicy::AskingPriceOnly
        {
            return Err(BusinessRuleViolation::BelowAskingPrice { offered: amount, asking }.into());
        }
        self.execute(state, finance, bid)
    }

    /// The seller takes the highest pending offer at or above the asking
    /// price. Equal offers go to the earlier bid.
    pub fn resolve_listing(
        &self,
        state: &mut SeasonState,
        finance: &FinanceEngine,
        seller: TeamId,
        listing: ListingId,
    ) -> Result<CompletedTransfer> {
        ensure_window(state)?;
        let target = state.market.listing(listing)?;
        if target.seller != seller {
            return Err(BusinessRuleViolation::NotSeller { listing, team: seller }.into());
        }
        ensure_active(listing, target.status)?;
        let asking = target.asking_price;

        let best = state
            .market
            .bids_for(listing)
            .filter(|b| b.status == BidStatus::Pending && b.proposed_by == BidParty::Buyer)
            .filter(|b| b.amount >= asking)
            .fold(None::<(i64, BidId)>, |best, b| match best {
                Some((amount, _)) if amount >= b.amount => best,
                _ => Some((b.amount, b.id)),
            })
            .map(|(_, id)| id)
            .ok_or(BusinessRuleViolation::NoQualifyingBid(listing))?;
        self.execute(state, finance, best)
    }

    /// Signs a player from the free-agent pool. The fee, if any, leaves the
    /// league.
    pub fn sign_free_agent(
        &self,
        state: &mut SeasonState,
        finance: &FinanceEngine,
        team: TeamId,
        player: PlayerId,
        fee: i64,
    ) -> Result<CompletedTransfer> {
        ensure_window(state)?;
        if fee < 0 {
            return Err(ValidationError::NonPositivePrice(fee).into());
        }
        state.team(team)?;
        if !state.player(player)?.is_free_agent() {
            return Err(BusinessRuleViolation::NotFreeAgent { player }.into());
        }
        self.ensure_room(state, team)?;
        if fee > 0 {
            finance.transfer_funds(&mut state.accounts, team, None, fee, state.current_matchday)?;
        }

        self.move_player(state, player, team, None)?;
        let transfer = CompletedTransfer {
            player,
            from: None,
            to: team,
            fee,
            matchday: state.current_matchday,
            listing: None,
        };
        log::info!("{} signed free agent {} for {}", team, player, fee);
        state.market.record(transfer.clone());
        Ok(transfer)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Returns (listing, buyer, proposer) of a pending bid on an active
    /// listing, if `acting` is the side that has to answer it.
    fn ensure_counterparty(
        &self,
        state: &SeasonState,
        acting: TeamId,
        bid: BidId,
    ) -> Result<(ListingId, TeamId, BidParty)> {
        let offer = state.market.bid(bid)?;
        if offer.status != BidStatus::Pending {
            return Err(BusinessRuleViolation::BidNotPending { bid, status: format!("{:?}", offer.status) }.into());
        }
        let listing = state.market.listing(offer.listing)?;
        ensure_active(listing.id, listing.status)?;
        let counterparty = match offer.proposed_by {
            BidParty::Buyer => listing.seller,
            BidParty::Seller => offer.buyer,
        };
        if acting != counterparty {
            return Err(BusinessRuleViolation::NotCounterparty { bid, team: acting }.into());
        }
        Ok((listing.id, offer.buyer, offer.proposed_by))
    }

    fn ensure_room(&self, state: &SeasonState, team: TeamId) -> Result<()> {
        let size = state.team(team)?.squad_size();
        if size >= self.config.max_squad_size {
            return Err(BusinessRuleViolation::SquadFull { team, size }.into());
        }
        Ok(())
    }

    /// Completes the deal behind a pending bid.
    fn execute(&self, state: &mut SeasonState, finance: &FinanceEngine, bid: BidId) -> Result<CompletedTransfer> {
        let offer = state.market.bid(bid)?.clone();
        let listing = state.market.listing(offer.listing)?.clone();

        let owner = state.player(listing.player)?.team;
        if owner != Some(listing.seller) {
            return Err(ValidationError::OwnershipMismatch {
                player: listing.player,
                claimed: listing.seller,
                owner,
            }
            .into());
        }
        self.ensure_room(state, offer.buyer)?;
        if state.team(listing.seller)?.squad_size() <= self.config.min_squad_size {
            return Err(BusinessRuleViolation::SquadTooSmall {
                team: listing.seller,
                min: self.config.min_squad_size,
            }
            .into());
        }

        let matchday = state.current_matchday;
        finance.transfer_funds(&mut state.accounts, offer.buyer, Some(listing.seller), offer.amount, matchday)?;
        self.move_player(state, listing.player, offer.buyer, Some(listing.seller))?;
        if let Some(player) = state.players.get_mut(&listing.player) {
            player.market_value = offer.amount;
        }

        state.market.bid_mut(bid)?.status = BidStatus::Accepted;
        state.market.listing_mut(listing.id)?.status = ListingStatus::Accepted;
        state.market.settle_pending(listing.id, BidStatus::Rejected);

        let transfer = CompletedTransfer {
            player: listing.player,
            from: Some(listing.seller),
            to: offer.buyer,
            fee: offer.amount,
            matchday,
            listing: Some(listing.id),
        };
        log::info!(
            "Transfer complete: {} from {} to {} for {}",
            listing.player,
            listing.seller,
            offer.buyer,
            offer.amount
        );
        state.market.record(transfer.clone());
        Ok(transfer)
    }

    /// Moves roster ownership. Callers have already checked every rule.
    fn move_player(
        &self,
        state: &mut SeasonState,
        player: PlayerId,
        to: TeamId,
        from: Option<TeamId>,
    ) -> Result<()> {
        if let Some(from) = from {
            state.team_mut(from)?.roster.retain(|id| *id != player);
        }
        state.team_mut(to)?.roster.push(player);

        let min_expiry = self.season_year.saturating_add(self.config.contract_extension_seasons);
        let moved = state.players.get_mut(&player).ok_or(ValidationError::UnknownPlayer(player))?;
        moved.team = Some(to);
        moved.contract.expires_season = moved.contract.expires_season.max(min_expiry);
        Ok(())
    }
}

fn ensure_window(state: &SeasonState) -> Result<()> {
    if !state.market.is_window_open() {
        return Err(BusinessRuleViolation::WindowClosed.into());
    }
    Ok(())
}

fn ensure_active(listing: ListingId, status: ListingStatus) -> Result<()> {
    if !status.is_active() {
        return Err(BusinessRuleViolation::ListingClosed { listing, status: format!("{:?}", status) }.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use crate::finance::{IncomeProfile, LedgerCategory};
    use crate::models::{Contract, PlayerAttributes, Position};
    use crate::season::state::test_support::setup;

    struct Harness {
        state: SeasonState,
        market: TransferMarket,
        finance: FinanceEngine,
    }

    fn market_with(policy: AcceptancePolicy, balances: &[i64]) -> Harness {
        let mut state = SeasonState::from_setup(&setup(balances.len() as u32, 1)).unwrap();
        let finance = FinanceEngine::default();
        for (team, balance) in state.team_ids().into_iter().zip(balances) {
            finance.open_account(&mut state.accounts, team, *balance, IncomeProfile::default()).unwrap();
        }
        let market = TransferMarket::new(TransferConfig { acceptance_policy: policy, ..Default::default() }, 2025);
        market.open_window(&mut state, WindowKind::Summer, 4);
        Harness { state, market, finance }
    }

    fn striker(state: &SeasonState, team: u32) -> PlayerId {
        state.squad(TeamId(team)).unwrap().iter().find(|p| p.position == Position::ST).unwrap().id
    }

    #[test]
    fn test_listing_to_completed_transfer() {
        let mut f = market_with(AcceptancePolicy::AskingPriceOnly, &[10_000_000, 10_000_000]);
        let player = striker(&f.state, 1);
        let listing = f.market.create_listing(&mut f.state, TeamId(1), player, 3_000_000).unwrap();
        assert_eq!(f.state.market().listing(listing).unwrap().status, ListingStatus::Open);

        let low = f.market.place_bid(&mut f.state, &f.finance, TeamId(2), listing, 2_000_000).unwrap();
        assert_eq!(f.state.market().listing(listing).unwrap().status, ListingStatus::UnderNegotiation);
        assert_eq!(
            f.market.accept_bid(&mut f.state, &f.finance, TeamId(1), low),
            Err(BusinessRuleViolation::BelowAskingPrice { offered: 2_000_000, asking: 3_000_000 }.into())
        );
        let high = f.market.place_bid(&mut f.state, &f.finance, TeamId(2), listing, 3_500_000).unwrap();

        let done = f.market.resolve_listing(&mut f.state, &f.finance, TeamId(1), listing).unwrap();
        assert_eq!(done.fee, 3_500_000);
        assert_eq!(f.state.market().bid(high).unwrap().status, BidStatus::Accepted);
        assert_eq!(f.state.market().bid(low).unwrap().status, BidStatus::Rejected);
        assert_eq!(f.state.market().listing(listing).unwrap().status, ListingStatus::Accepted);

        assert_eq!(f.state.player(player).unwrap().team, Some(TeamId(2)));
        assert!(f.state.team(TeamId(2)).unwrap().roster.contains(&player));
        assert!(!f.state.team(TeamId(1)).unwrap().roster.contains(&player));
        assert_eq!(f.state.player(player).unwrap().contract.expires_season, 2028);
        assert_eq!(f.state.account(TeamId(1)).unwrap().balance(), 13_500_000);
        assert_eq!(f.state.account(TeamId(2)).unwrap().balance(), 6_500_000);
        assert_eq!(f.state.market().completed().len(), 1);
        f.state.audit().unwrap();
    }

    #[test]
    fn test_unaffordable_acceptance_leaves_state_unchanged() {
        let mut f = market_with(AcceptancePolicy::AskingPriceOnly, &[1_000, 100]);
        let player = striker(&f.state, 1);
        let listing = f.market.create_listing(&mut f.state, TeamId(1), player, 150).unwrap();

        // Team 2 can afford 100 at bid time; the seller counters at 150.
        let bid = f.market.place_bid(&mut f.state, &f.finance, TeamId(2), listing, 100).unwrap();
        assert_eq!(
            f.market.place_bid(&mut f.state, &f.finance, TeamId(2), listing, 150),
            Err(SimError::BusinessRule(BusinessRuleViolation::InsufficientFunds {
                team: TeamId(2),
                required: 150,
                available: 100,
            }))
        );
        let counter = f.market.counter_bid(&mut f.state, &f.finance, TeamId(1), bid, 150).unwrap();
        let before = f.state.clone();
        assert_eq!(
            f.market.accept_bid(&mut f.state, &f.finance, TeamId(2), counter),
            Err(SimError::BusinessRule(BusinessRuleViolation::InsufficientFunds {
                team: TeamId(2),
                required: 150,
                available: 100,
            }))
        );
        assert_eq!(f.state, before);
        assert_eq!(f.state.account(TeamId(2)).unwrap().balance(), 100);
        assert_eq!(f.state.player(player).unwrap().team, Some(TeamId(1)));
    }

    #[test]
    fn test_counter_offer_chain() {
        let mut f = market_with(AcceptancePolicy::AskingPriceOnly, &[5_000_000, 5_000_000]);
        let player = striker(&f.state, 1);
        let listing = f.market.create_listing(&mut f.state, TeamId(1), player, 2_000_000).unwrap();
        let first = f.market.place_bid(&mut f.state, &f.finance, TeamId(2), listing, 1_000_000).unwrap();

        // Only the seller may answer the buyer's bid.
        assert_eq!(
            f.market.counter_bid(&mut f.state, &f.finance, TeamId(2), first, 1_100_000),
            Err(BusinessRuleViolation::NotCounterparty { bid: first, team: TeamId(2) }.into())
        );
        let second = f.market.counter_bid(&mut f.state, &f.finance, TeamId(1), first, 1_800_000).unwrap();
        let third = f.market.counter_bid(&mut f.state, &f.finance, TeamId(2), second, 1_500_000).unwrap();
        assert_eq!(f.state.market().bid(first).unwrap().status, BidStatus::Countered);
        assert_eq!(f.state.market().bid(third).unwrap().parent, Some(second));
        assert_eq!(f.state.market().bid(third).unwrap().proposed_by, BidParty::Buyer);

        f.market.reject_bid(&mut f.state, TeamId(1), third).unwrap();
        assert_eq!(
            f.market.accept_bid(&mut f.state, &f.finance, TeamId(1), third),
            Err(BusinessRuleViolation::BidNotPending { bid: third, status: "Rejected".into() }.into())
        );
    }

    #[test]
    fn test_manager_discretion_allows_below_asking() {
        let mut f = market_with(AcceptancePolicy::ManagerDiscretion, &[5_000_000, 5_000_000]);
        let player = striker(&f.state, 1);
        let listing = f.market.create_listing(&mut f.state, TeamId(1), player, 2_000_000).unwrap();
        let bid = f.market.place_bid(&mut f.state, &f.finance, TeamId(2), listing, 900_000).unwrap();
        // Discretion is an explicit acceptance, never automatic.
        assert_eq!(
            f.market.resolve_listing(&mut f.state, &f.finance, TeamId(1), listing),
            Err(BusinessRuleViolation::NoQualifyingBid(listing).into())
        );
        let done = f.market.accept_bid(&mut f.state, &f.finance, TeamId(1), bid).unwrap();
        assert_eq!(done.fee, 900_000);
    }

    #[test]
    fn test_closed_listings_and_window() {
        let mut f = market_with(AcceptancePolicy::AskingPriceOnly, &[5_000_000, 5_000_000, 5_000_000]);
        let player = striker(&f.state, 1);
        assert_eq!(
            f.market.create_listing(&mut f.state, TeamId(2), player, 1_000),
            Err(ValidationError::OwnershipMismatch { player, claimed: TeamId(2), owner: Some(TeamId(1)) }.into())
        );
        assert_eq!(
            f.market.create_listing(&mut f.state, TeamId(1), player, 0),
            Err(ValidationError::NonPositivePrice(0).into())
        );
        let listing = f.market.create_listing(&mut f.state, TeamId(1), player, 1_000).unwrap();
        assert_eq!(
            f.market.create_listing(&mut f.state, TeamId(1), player, 2_000),
            Err(BusinessRuleViolation::AlreadyListed(player).into())
        );
        assert_eq!(
            f.market.place_bid(&mut f.state, &f.finance, TeamId(1), listing, 1_000),
            Err(BusinessRuleViolation::SelfBid(TeamId(1)).into())
        );
        let pending = f.market.place_bid(&mut f.state, &f.finance, TeamId(3), listing, 500).unwrap();

        f.market.withdraw_listing(&mut f.state, TeamId(1), listing).unwrap();
        assert_eq!(f.state.market().bid(pending).unwrap().status, BidStatus::Rejected);
        assert!(matches!(
            f.market.place_bid(&mut f.state, &f.finance, TeamId(2), listing, 2_000),
            Err(SimError::BusinessRule(BusinessRuleViolation::ListingClosed { .. }))
        ));

        let relisted = f.market.create_listing(&mut f.state, TeamId(1), player, 1_000).unwrap();
        let open_bid = f.market.place_bid(&mut f.state, &f.finance, TeamId(2), relisted, 800).unwrap();
        let closure = f.market.close_window(&mut f.state);
        assert_eq!(closure.expired_listings, vec![relisted]);
        assert_eq!(closure.expired_bids, vec![open_bid]);
        assert_eq!(f.state.market().bid(open_bid).unwrap().status, BidStatus::Expired);
        assert_eq!(
            f.market.place_bid(&mut f.state, &f.finance, TeamId(2), relisted, 2_000),
            Err(BusinessRuleViolation::WindowClosed.into())
        );

        // A new window starts with a clean book.
        f.market.open_window(&mut f.state, WindowKind::Winter, 2);
        assert_eq!(f.state.market().listings().count(), 0);
        assert!(f.market.create_listing(&mut f.state, TeamId(1), player, 1_000).unwrap() > relisted);
    }

    #[test]
    fn test_squad_limits() {
        let mut f = market_with(AcceptancePolicy::AskingPriceOnly, &[5_000_000, 5_000_000]);
        let market = TransferMarket::new(
            TransferConfig { max_squad_size: 16, min_squad_size: 16, ..Default::default() },
            2025,
        );
        let player = striker(&f.state, 1);
        let listing = market.create_listing(&mut f.state, TeamId(1), player, 1_000).unwrap();
        // Buyer squad is already at 16.
        assert_eq!(
            market.place_bid(&mut f.state, &f.finance, TeamId(2), listing, 1_000),
            Err(BusinessRuleViolation::SquadFull { team: TeamId(2), size: 16 }.into())
        );

        let bid = f.market.place_bid(&mut f.state, &f.finance, TeamId(2), listing, 1_000).unwrap();
        let strict_seller = TransferMarket::new(
            TransferConfig { min_squad_size: 16, ..Default::default() },
            2025,
        );
        assert_eq!(
            strict_seller.accept_bid(&mut f.state, &f.finance, TeamId(1), bid),
            Err(BusinessRuleViolation::SquadTooSmall { team: TeamId(1), min: 16 }.into())
        );
    }

    #[test]
    fn test_free_agent_signing() {
        let mut f = market_with(AcceptancePolicy::AskingPriceOnly, &[1_000_000, 1_000_000]);
        let done = f.market.sign_free_agent(&mut f.state, &f.finance, TeamId(2), PlayerId(9_001), 250_000).unwrap();
        assert_eq!(done.from, None);
        assert_eq!(f.state.player(PlayerId(9_001)).unwrap().team, Some(TeamId(2)));
        assert_eq!(f.state.account(TeamId(2)).unwrap().total(LedgerCategory::SigningFee), -250_000);
        assert_eq!(
            f.market.sign_free_agent(&mut f.state, &f.finance, TeamId(1), PlayerId(9_001), 0),
            Err(BusinessRuleViolation::NotFreeAgent { player: PlayerId(9_001) }.into())
        );
        f.market.sign_free_agent(&mut f.state, &f.finance, TeamId(1), PlayerId(9_002), 0).unwrap();
        assert_eq!(f.state.account(TeamId(1)).unwrap().balance(), 1_000_000);
        f.state.audit().unwrap();
    }

    #[test]
    fn test_estimate_value() {
        let mut p = Player::new(
            PlayerId(1),
            "Value",
            20,
            Position::ST,
            PlayerAttributes::default(),
            Contract { wage: 0, expires_season: 2030 },
            1_000_000,
        )
        .with_team(TeamId(1));
        assert_eq!(estimate_value(&p, 2025), 1_200_000);

        p.age = 31;
        p.season.goals = 5;
        assert_eq!(estimate_value(&p, 2025), 1_700_000);

        p.contract.expires_season = 2026;
        assert_eq!(estimate_value(&p, 2025), 850_000);

        p.contract.expires_season = 2027;
        assert_eq!(estimate_value(&p, 2025), 1_275_000);

        p.team = None;
        p.age = 35;
        p.season.goals = 0;
        assert_eq!(estimate_value(&p, 2025), MIN_MARKET_VALUE);
    }

    #[test]
    fn test_free_agent_value_keeps_contract_discount() {
        let mut p = Player::new(
            PlayerId(2),
            "Free",
            25,
            Position::CM,
            PlayerAttributes::default(),
            Contract { wage: 0, expires_season: 2030 },
            10_000_000,
        );
        assert_eq!(estimate_value(&p, 2025), 2_000_000);

        p.contract.expires_season = 2027;
        assert_eq!(estimate_value(&p, 2025), 1_500_000);

        p.contract.expires_season = 2025;
        assert_eq!(estimate_value(&p, 2025), 1_000_000);
    }
}
