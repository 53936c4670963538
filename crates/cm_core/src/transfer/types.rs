use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::{BidId, ListingId, PlayerId, TeamId};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Open,
    UnderNegotiation,
    Accepted,
    Withdrawn,
    Expired,
}

impl ListingStatus {
    /// Open or under negotiation.
    pub fn is_active(&self) -> bool {
        matches!(self, ListingStatus::Open | ListingStatus::UnderNegotiation)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    Pending,
    Accepted,
    Rejected,
    Countered,
    /// Still pending when the window closed.
    Expired,
}

/// Which side of the deal made an offer. Counter-offers alternate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BidParty {
    Buyer,
    Seller,
}

impl BidParty {
    pub fn other(&self) -> Self {
        match self {
            BidParty::Buyer => BidParty::Seller,
            BidParty::Seller => BidParty::Buyer,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferListing {
    pub id: ListingId,
    pub player: PlayerId,
    pub seller: TeamId,
    pub asking_price: i64,
    pub status: ListingStatus,
    pub listed_matchday: u16,
}

/// An offer on a listing. `buyer` is the prospective buying club for the
/// whole negotiation chain, whoever proposed this particular amount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bid {
    pub id: BidId,
    pub listing: ListingId,
    pub buyer: TeamId,
    pub amount: i64,
    pub status: BidStatus,
    pub proposed_by: BidParty,
    /// The bid this one counters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<BidId>,
    pub matchday: u16,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    Summer,
    Winter,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferWindow {
    pub kind: WindowKind,
    /// Last completed matchday when the window opened.
    pub opened_after: u16,
    /// The window closes once this matchday is complete.
    pub closes_after: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletedTransfer {
    pub player: PlayerId,
    /// `None` for a free-agent signing.
    pub from: Option<TeamId>,
    pub to: TeamId,
    pub fee: i64,
    pub matchday: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing: Option<ListingId>,
}

/// Listings and bids of the current window, plus the season's completed
/// deals. Only the transfer market writes to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MarketBook {
    listings: BTreeMap<ListingId, TransferListing>,
    bids: BTreeMap<BidId, Bid>,
    window: Option<TransferWindow>,
    next_listing: u32,
    next_bid: u32,
    completed: Vec<CompletedTransfer>,
}

impl MarketBook {
    pub fn window(&self) -> Option<TransferWindow> {
        self.window
    }

    pub fn is_window_open(&self) -> bool {
        self.window.is_some()
    }

    pub fn listings(&self) -> impl Iterator<Item = &TransferListing> + '_ {
        self.listings.values()
    }

    pub fn active_listings(&self) -> impl Iterator<Item = &TransferListing> + '_ {
        self.listings.values().filter(|l| l.status.is_active())
    }

    pub fn listing(&self, id: ListingId) -> Result<&TransferListing, ValidationError> {
        self.listings.get(&id).ok_or(ValidationError::UnknownListing(id))
    }

    pub fn active_listing_for(&self, player: PlayerId) -> Option<&TransferListing> {
        self.active_listings().find(|l| l.player == player)
    }

    pub fn bids(&self) -> impl Iterator<Item = &Bid> + '_ {
        self.bids.values()
    }

    pub fn bid(&self, id: BidId) -> Result<&Bid, ValidationError> {
        self.bids.get(&id).ok_or(ValidationError::UnknownBid(id))
    }

    /// Bids on `listing` in the order they were made.
    pub fn bids_for(&self, listing: ListingId) -> impl Iterator<Item = &Bid> + '_ {
        self.bids.values().filter(move |b| b.listing == listing)
    }

    pub fn completed(&self) -> &[CompletedTransfer] {
        &self.completed
    }

    pub(crate) fn set_window(&mut self, window: Option<TransferWindow>) {
        self.window = window;
    }

    pub(crate) fn insert_listing(
        &mut self,
        player: PlayerId,
        seller: TeamId,
        asking_price: i64,
        matchday: u16,
    ) -> ListingId {
        let id = ListingId(self.next_listing);
        self.next_listing += 1;
        self.listings.insert(
            id,
            TransferListing {
                id,
                player,
                seller,
                asking_price,
                status: ListingStatus::Open,
                listed_matchday: matchday,
            },
        );
        id
    }

    pub(crate) fn insert_bid(
        &mut self,
        listing: ListingId,
        buyer: TeamId,
        amount: i64,
        proposed_by: BidParty,
        parent: Option<BidId>,
        matchday: u16,
    ) -> BidId {
        let id = BidId(self.next_bid);
        self.next_bid += 1;
        self.bids.insert(
            id,
            Bid { id, listing, buyer, amount, status: BidStatus::Pending, proposed_by, parent, matchday },
        );
        id
    }

    pub(crate) fn listing_mut(&mut self, id: ListingId) -> Result<&mut TransferListing, ValidationError> {
        self.listings.get_mut(&id).ok_or(ValidationError::UnknownListing(id))
    }

    pub(crate) fn bid_mut(&mut self, id: BidId) -> Result<&mut Bid, ValidationError> {
        self.bids.get_mut(&id).ok_or(ValidationError::UnknownBid(id))
    }

    /// Marks every other pending bid on `listing` with `status`.
    pub(crate) fn settle_pending(&mut self, listing: ListingId, status: BidStatus) -> Vec<BidId> {
        let mut touched = Vec::new();
        for bid in self.bids.values_mut() {
            if bid.listing == listing && bid.status == BidStatus::Pending {
                bid.status = status;
                touched.push(bid.id);
            }
        }
        touched
    }

    pub(crate) fn record(&mut self, transfer: CompletedTransfer) {
        self.completed.push(transfer);
    }

    /// Drops listings and bids that reached a final state. Ids keep counting
    /// up so they stay unique for the season.
    pub(crate) fn purge_closed(&mut self) {
        self.listings.retain(|_, l| l.status.is_active());
        let listings = &self.listings;
        self.bids.retain(|_, b| listings.contains_key(&b.listing));
    }

    /// Expires everything still open. Returns the expired listing and bid ids.
    pub(crate) fn expire_open(&mut self) -> (Vec<ListingId>, Vec<BidId>) {
        let mut listings = Vec::new();
        for listing in self.listings.values_mut().filter(|l| l.status.is_active()) {
            listing.status = ListingStatus::Expired;
            listings.push(listing.id);
        }
        let mut bids = Vec::new();
        for bid in self.bids.values_mut().filter(|b| b.status == BidStatus::Pending) {
            bid.status = BidStatus::Expired;
            bids.push(bid.id);
        }
        (listings, bids)
    }
}
