use pricelens::core::db::{AuctionDb, BidRepository};

#[tokio::test]
async fn test_simple() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("auction.db");
    let db: AuctionDb = AuctionDb::new(&path).await?;

    let bids = db.get_auction_bids(1).await?;
    assert_eq!(bids.len(), 0);

    Ok(())
}
