use anyhow::Result;
use httpmock::prelude::*;
use rvc_client::app::views;
use rvc_client::core::api_client::DEFAULT_TIMEOUT;
use rvc_client::core::opportunities::{self, QuickFilter};
use rvc_client::core::OpportunityQuery;
use rvc_client::{HttpRvcClient, RvcError};
use serde_json::json;
use tempfile::TempDir;

fn page() -> serde_json::Value {
    json!({
        "status": "success",
        "data": {
            "opportunities": [
                {"ticker": "NVDA", "company_name": "NVIDIA", "rvc_score": 84.5,
                 "sector": "Technology", "market_cap": 2.9e12, "pe_ratio": 61.2,
                 "current_price": 1234.5},
                {"ticker": "V", "company_name": "Visa", "rvc_score": 76.0,
                 "sector": "Financial Services"}
            ],
            "metadata": {"total_count": 2, "average_score": 80.25}
        }
    })
}

#[tokio::test]
async fn test_preset_sets_query_params() -> Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/top-opportunities")
            .query_param("min_score", "75")
            .query_param("limit", "10")
            .query_param("currency", "EUR");
        then.status(200).json_body(page());
    });
    let api = HttpRvcClient::new(&server.base_url(), DEFAULT_TIMEOUT)?;

    let mut query = OpportunityQuery::default();
    QuickFilter::Premium.apply(&mut query);
    query.currency = Some("eur".to_string());

    let page = opportunities::fetch(&api, &query).await?;
    mock.assert();
    assert_eq!(page.opportunities.len(), 2);

    let text = views::opportunities::render(&page);
    assert!(text.contains("🥇"));
    assert!(text.contains("84.5 (excellent)"));
    assert!(text.contains("$1,234.50"));
    assert!(text.contains("$2.9T"));

    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("top.csv");
    views::opportunities::write_csv(std::fs::File::create(&path)?, &page)?;
    let csv = std::fs::read_to_string(&path)?;
    assert!(csv.starts_with("ticker,company_name,rvc_score"));
    assert_eq!(csv.lines().count(), 3);
    Ok(())
}

#[tokio::test]
async fn test_invalid_query_sends_no_request() -> Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/top-opportunities");
        then.status(200).json_body(page());
    });
    let api = HttpRvcClient::new(&server.base_url(), DEFAULT_TIMEOUT)?;

    let query = OpportunityQuery {
        limit: 0,
        ..OpportunityQuery::default()
    };
    let err = opportunities::fetch(&api, &query).await.unwrap_err();
    assert!(matches!(err, RvcError::Validation { .. }));
    mock.assert_hits(0);
    Ok(())
}

#[tokio::test]
async fn test_server_message_is_surfaced() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/top-opportunities");
        then.status(503)
            .json_body(json!({"status": "error", "message": "Ranking is being rebuilt"}));
    });
    let api = HttpRvcClient::new(&server.base_url(), DEFAULT_TIMEOUT)?;

    match opportunities::fetch(&api, &OpportunityQuery::default()).await {
        Err(RvcError::Api { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "Ranking is being rebuilt");
        }
        other => panic!("expected an API error, got {:?}", other),
    }
    Ok(())
}
