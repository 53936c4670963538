//! Transfer windows, listings, bids and free-agent signings.

pub mod market;
pub mod types;

pub use market::{estimate_value, TransferMarket, WindowClosure, MIN_MARKET_VALUE};
pub use types::{
    Bid, BidParty, BidStatus, CompletedTransfer, ListingStatus, MarketBook, TransferListing,
    TransferWindow, WindowKind,
};
