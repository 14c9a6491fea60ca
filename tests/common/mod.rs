mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from pricelens for tests
pub use pricelens::core::db::{
    AuctionBid, AuctionDb, Bid, BidRepository, NewBid, NewUser, User, UserRepository,
};
pub use pricelens::{
    BoundingBox, DetectedLabel, Outcome, Pipeline, PipelineConfig, PriceFilter, PriceResult,
    PriceStrategy, SelectionPolicy, ShoppingResult,
};
