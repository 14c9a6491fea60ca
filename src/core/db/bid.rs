use time::OffsetDateTime;

use crate::core::db::state::parse_rfc3339;

#[derive(Debug, Clone)]
pub struct Bid {
    pub id: i64,
    pub user_id: i64,
    pub auction_id: i64,
    pub amount: f64,
    pub placed_at: OffsetDateTime,
    pub(super) _guard: (),
}

#[derive(Debug, Clone)]
pub struct NewBid {
    pub user_id: i64,
    pub auction_id: i64,
    pub amount: f64,
}

/// A bid on an auction together with the bidder's email
#[derive(Debug, Clone)]
pub struct AuctionBid {
    pub bid_id: i64,
    pub user_id: i64,
    pub user_email: String,
    pub amount: f64,
    pub placed_at: OffsetDateTime,
    pub(super) _guard: (),
}

#[derive(sqlx::FromRow)]
pub(super) struct BidRecord {
    pub id: i64,
    pub user_id: i64,
    pub auction_id: i64,
    pub amount: f64,
    pub placed_at: String,
}

impl TryFrom<BidRecord> for Bid {
    type Error = anyhow::Error;

    fn try_from(record: BidRecord) -> Result<Self, Self::Error> {
        Ok(Bid {
            id: record.id,
            user_id: record.user_id,
            auction_id: record.auction_id,
            amount: record.amount,
            placed_at: parse_rfc3339(&record.placed_at)?,
            _guard: (),
        })
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct AuctionBidRecord {
    pub bid_id: i64,
    pub user_id: i64,
    pub user_email: String,
    pub amount: f64,
    pub placed_at: String,
}

impl TryFrom<AuctionBidRecord> for AuctionBid {
    type Error = anyhow::Error;

    fn try_from(record: AuctionBidRecord) -> Result<Self, Self::Error> {
        Ok(AuctionBid {
            bid_id: record.bid_id,
            user_id: record.user_id,
            user_email: record.user_email,
            amount: record.amount,
            placed_at: parse_rfc3339(&record.placed_at)?,
            _guard: (),
        })
    }
}

/// Smallest raise allowed over `current_price`
pub fn minimum_bid_increment(current_price: f64) -> f64 {
    const TIERS: &[(f64, f64)] = &[
        (0.0, 0.01),
        (0.99, 0.05),
        (2.49, 0.10),
        (4.99, 0.25),
        (9.99, 0.50),
        (24.99, 1.00),
        (49.99, 2.50),
        (99.99, 5.00),
        (249.99, 7.50),
        (499.99, 10.00),
        (999.99, 25.00),
        (2499.99, 50.00),
        (4999.99, 75.00),
        (9999.99, 100.00),
        (24999.99, 250.00),
    ];
    TIERS
        .iter()
        .find(|(upper, _)| current_price <= *upper)
        .map(|(_, increment)| *increment)
        .unwrap_or(500.00)
}

/// Lowest acceptable next bid, or `None` when any positive amount is fine
pub fn minimum_next_bid(highest: Option<f64>) -> Option<f64> {
    highest.map(|current| current + minimum_bid_increment(current))
}

/// Compare in whole cents so float noise never rejects an exact bid
pub(super) fn meets_minimum(amount: f64, minimum: f64) -> bool {
    (amount * 100.0).round() >= (minimum * 100.0).round()
}

pub trait BidRepository {
    fn place_bid(&self, bid: &NewBid) -> impl Future<Output = anyhow::Result<Bid>>;
    fn get_user_bids(&self, user_id: i64) -> impl Future<Output = anyhow::Result<Vec<Bid>>>;
    fn get_auction_bids(
        &self,
        auction_id: i64,
    ) -> impl Future<Output = anyhow::Result<Vec<AuctionBid>>>;
    fn get_highest_bid(&self, auction_id: i64)
    -> impl Future<Output = anyhow::Result<Option<Bid>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_follow_price_tiers() {
        assert_eq!(minimum_bid_increment(-1.0), 0.01);
        assert_eq!(minimum_bid_increment(0.5), 0.05);
        assert_eq!(minimum_bid_increment(5.0), 0.50);
        assert_eq!(minimum_bid_increment(24.99), 1.00);
        assert_eq!(minimum_bid_increment(100.0), 7.50);
        assert_eq!(minimum_bid_increment(30_000.0), 500.00);
    }

    #[test]
    fn next_bid_adds_increment() {
        assert_eq!(minimum_next_bid(None), None);
        assert_eq!(minimum_next_bid(Some(100.50)), Some(108.0));
        assert!(meets_minimum(0.1 + 0.2, 0.3));
        assert!(!meets_minimum(107.99, 108.0));
    }
}
