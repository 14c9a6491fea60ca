mod bid;
mod state;
mod user;

use std::{path::Path, sync::Arc};

use anyhow::Context;
use log::debug;
use state::{StoreState, now_rfc3339};

pub use bid::{
    AuctionBid, Bid, BidRepository, NewBid, minimum_bid_increment, minimum_next_bid,
};
pub use user::{NewUser, User, UserRepository};

use bid::{AuctionBidRecord, BidRecord, meets_minimum};
use user::UserRecord;

/// Users and bids for the auction front end
#[derive(Debug, Clone)]
pub struct AuctionDb {
    state: Arc<StoreState>,
}

impl AuctionDb {
    pub async fn new<P: AsRef<Path>>(db_file: P) -> anyhow::Result<Self> {
        Ok(Self {
            state: Arc::new(StoreState::new(db_file).await?),
        })
    }

    /// Close every pooled connection. Further queries fail.
    pub async fn close(&self) {
        self.state.close().await
    }
}

impl UserRepository for AuctionDb {
    async fn create_user(&self, user: &NewUser) -> anyhow::Result<User> {
        let email = user.email.trim();
        if email.is_empty() || !email.contains('@') {
            anyhow::bail!("Invalid email address: {:?}", user.email);
        }
        if user.password_hash.is_empty() {
            anyhow::bail!("Password hash must not be empty");
        }

        let mut conn = self.state.conn().await?;
        let created_at = now_rfc3339()?;
        let record: UserRecord = sqlx::query_as(
            r#"INSERT INTO users (email, password_hash, created_at) VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, created_at"#,
        )
        .bind(email)
        .bind(&user.password_hash)
        .bind(&created_at)
        .fetch_one(&mut *conn)
        .await
        .with_context(|| format!("Failed to create user {:?}", email))?;
        debug!("Created user {} ({})", record.id, record.email);
        User::try_from(record)
    }

    async fn get_user(&self, id: i64) -> anyhow::Result<Option<User>> {
        let mut conn = self.state.conn().await?;
        sqlx::query_as::<_, UserRecord>(
            r#"SELECT id, email, password_hash, created_at FROM users WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .map(User::try_from)
        .transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let mut conn = self.state.conn().await?;
        sqlx::query_as::<_, UserRecord>(
            r#"SELECT id, email, password_hash, created_at FROM users WHERE email = $1"#,
        )
        .bind(email.trim())
        .fetch_optional(&mut *conn)
        .await?
        .map(User::try_from)
        .transpose()
    }
}

impl BidRepository for AuctionDb {
    async fn place_bid(&self, bid: &NewBid) -> anyhow::Result<Bid> {
        if !(bid.amount.is_finite() && bid.amount > 0.0) {
            anyhow::bail!("Bid amount must be positive, got {}", bid.amount);
        }

        // Dropping `tx` on any early return rolls the transaction back.
        let mut tx = self.state.begin().await?;

        let user_exists: Option<i64> = sqlx::query_scalar(r#"SELECT id FROM users WHERE id = $1"#)
            .bind(bid.user_id)
            .fetch_optional(&mut *tx)
            .await?;
        if user_exists.is_none() {
            anyhow::bail!("User {} does not exist", bid.user_id);
        }

        let highest: Option<f64> =
            sqlx::query_scalar(r#"SELECT MAX(amount) FROM bids WHERE auction_id = $1"#)
                .bind(bid.auction_id)
                .fetch_one(&mut *tx)
                .await?;
        if let Some(minimum) = minimum_next_bid(highest) {
            if !meets_minimum(bid.amount, minimum) {
                anyhow::bail!(
                    "Bid of {:.2} on auction {} is below the minimum of {:.2}",
                    bid.amount,
                    bid.auction_id,
                    minimum
                );
            }
        }

        let placed_at = now_rfc3339()?;
        let record: BidRecord = sqlx::query_as(
            r#"INSERT INTO bids (user_id, auction_id, amount, placed_at) VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, auction_id, amount, placed_at"#,
        )
        .bind(bid.user_id)
        .bind(bid.auction_id)
        .bind(bid.amount)
        .bind(&placed_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(
            "User {} bid {:.2} on auction {}",
            record.user_id, record.amount, record.auction_id
        );
        Bid::try_from(record)
    }

    async fn get_user_bids(&self, user_id: i64) -> anyhow::Result<Vec<Bid>> {
        let mut conn = self.state.conn().await?;
        sqlx::query_as::<_, BidRecord>(
            r#"SELECT id, user_id, auction_id, amount, placed_at FROM bids
            WHERE user_id = $1
            ORDER BY amount DESC, id ASC"#,
        )
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(Bid::try_from)
        .collect()
    }

    async fn get_auction_bids(&self, auction_id: i64) -> anyhow::Result<Vec<AuctionBid>> {
        let mut conn = self.state.conn().await?;
        sqlx::query_as::<_, AuctionBidRecord>(
            r#"SELECT
                b.id AS bid_id,
                b.user_id AS user_id,
                u.email AS user_email,
                b.amount AS amount,
                b.placed_at AS placed_at
            FROM bids b
            JOIN users u ON b.user_id = u.id
            WHERE b.auction_id = $1
            ORDER BY b.amount DESC, b.id ASC"#,
        )
        .bind(auction_id)
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(AuctionBid::try_from)
        .collect()
    }

    async fn get_highest_bid(&self, auction_id: i64) -> anyhow::Result<Option<Bid>> {
        let mut conn = self.state.conn().await?;
        sqlx::query_as::<_, BidRecord>(
            r#"SELECT id, user_id, auction_id, amount, placed_at FROM bids
            WHERE auction_id = $1
            ORDER BY amount DESC, id ASC
            LIMIT 1"#,
        )
        .bind(auction_id)
        .fetch_optional(&mut *conn)
        .await?
        .map(Bid::try_from)
        .transpose()
    }
}
