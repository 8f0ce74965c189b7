use crate::error::{Result, ScanError};
use crate::fetch::Fetcher;
use crate::markup::{DetailMarkup, MapMarkup};
use crate::record::HotelRecord;
use crate::urls::resolve_link;
use scraper::Html;
use std::sync::Arc;
use tracing::info;

struct DetailFields {
    name: String,
    price_text: String,
    hotel_type: String,
    map_url: String,
}

/// Turns one detail URL into a [`HotelRecord`], following its map link.
pub struct DetailExtractor<M> {
    fetcher: Arc<Fetcher>,
    markup: Arc<M>,
    base_url: String,
}

impl<M: DetailMarkup + MapMarkup> DetailExtractor<M> {
    pub fn new(fetcher: Arc<Fetcher>, markup: Arc<M>, base_url: &str) -> Self {
        Self {
            fetcher,
            markup,
            base_url: base_url.to_string(),
        }
    }

    pub async fn extract(&self, detail_url: &str) -> Result<HotelRecord> {
        info!("Fetching response for property URL: {}", detail_url);
        let detail = self.fetcher.fetch(detail_url).await?;
        let fields = self.detail_fields(detail_url, &detail.text)?;

        let map = self.fetcher.fetch(&fields.map_url).await?;
        let location = self.location(&fields.map_url, &map.text)?;

        Ok(HotelRecord {
            name: fields.name,
            source_url: detail_url.to_string(),
            location,
            price_text: fields.price_text,
            hotel_type: fields.hotel_type,
        })
    }

    fn detail_fields(&self, detail_url: &str, html: &str) -> Result<DetailFields> {
        let doc = Html::parse_document(html);
        let missing = |field: &'static str| ScanError::Extraction {
            url: detail_url.to_string(),
            field,
        };

        let name = self.markup.hotel_name(&doc).ok_or_else(|| missing("hotel name"))?;
        let price_text = self.markup.price_text(&doc).ok_or_else(|| missing("price"))?;
        let hotel_type = self.markup.hotel_type(&doc).ok_or_else(|| missing("hotel type"))?;
        let map_url = self
            .markup
            .map_link(&doc)
            .and_then(|href| resolve_link(&self.base_url, &href))
            .ok_or_else(|| missing("map link"))?;

        Ok(DetailFields {
            name,
            price_text,
            hotel_type,
            map_url,
        })
    }

    fn location(&self, map_url: &str, html: &str) -> Result<String> {
        let doc = Html::parse_document(html);
        self.markup
            .location(&doc)
            .ok_or_else(|| ScanError::Extraction {
                url: map_url.to_string(),
                field: "location",
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::markup::JalanMarkup;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    fn detail_html(price: Option<&str>) -> String {
        let price = price
            .map(|p| format!(r#"<div class="p-planOverview__charge"><p><em>{}</em></p></div>"#, p))
            .unwrap_or_default();
        format!(
            r#"<html><body>
                <div id="hotel_name"><a href="/yad1/">ホテル海風</a></div>
                {}
                <div id="roomTypeNameId"><p><span>洋室ツイン</span></p></div>
                <a target="map" onclick="window.open('/yad1/map/', 'map', 'width=600');">地図</a>
            </body></html>"#,
            price
        )
    }

    const MAP_HTML: &str = r#"<html><body><div class="map__yadInfo">
        <p>ホテル海風</p><p>沖縄県那覇市前島1-2-3</p>
    </div></body></html>"#;

    async fn mount_html(server: &MockServer, at: &str, body: String, times: u64) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html; charset=utf-8")
                    .set_body_bytes(body.into_bytes()),
            )
            .expect(times)
            .mount(server)
            .await;
    }

    fn extractor(server: &MockServer) -> DetailExtractor<JalanMarkup> {
        let config = SiteConfig::new(server.uri());
        DetailExtractor::new(
            Arc::new(Fetcher::new(&config).unwrap()),
            Arc::new(JalanMarkup::new()),
            &config.base_url,
        )
    }

    #[tokio::test]
    async fn test_extracts_record_through_map_page() {
        let server = MockServer::start().await;
        mount_html(&server, "/yad1/plan/", detail_html(Some("¥8,800")), 1).await;
        mount_html(&server, "/yad1/map/", MAP_HTML.to_string(), 1).await;

        let url = format!("{}/yad1/plan/", server.uri());
        let record = extractor(&server).extract(&url).await.unwrap();

        assert_eq!(
            record,
            HotelRecord::new("ホテル海風", url, "沖縄県那覇市前島1-2-3", "¥8,800", "洋室ツイン")
        );
    }

    #[tokio::test]
    async fn test_missing_price_drops_record_without_map_fetch() {
        let server = MockServer::start().await;
        mount_html(&server, "/yad1/plan/", detail_html(None), 1).await;
        mount_html(&server, "/yad1/map/", MAP_HTML.to_string(), 0).await;

        let url = format!("{}/yad1/plan/", server.uri());
        let err = extractor(&server).extract(&url).await.unwrap_err();

        match err {
            ScanError::Extraction { url: failed, field } => {
                assert_eq!(failed, url);
                assert_eq!(field, "price");
            }
            other => panic!("expected an extraction error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_map_page_drops_record() {
        let server = MockServer::start().await;
        mount_html(&server, "/yad1/plan/", detail_html(Some("5000")), 1).await;
        mount_html(&server, "/yad1/map/", "<html><body></body></html>".to_string(), 1).await;

        let url = format!("{}/yad1/plan/", server.uri());
        let err = extractor(&server).extract(&url).await.unwrap_err();
        assert!(matches!(err, ScanError::Extraction { field: "location", .. }));
    }

    #[tokio::test]
    async fn test_unreachable_map_page_is_a_network_error() {
        let server = MockServer::start().await;
        mount_html(&server, "/yad1/plan/", detail_html(Some("5000")), 1).await;
        Mock::given(method("GET"))
            .and(path("/yad1/map/"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let url = format!("{}/yad1/plan/", server.uri());
        let err = extractor(&server).extract(&url).await.unwrap_err();
        assert!(matches!(err, ScanError::Network { .. }));
    }
}
