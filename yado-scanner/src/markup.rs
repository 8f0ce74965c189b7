//! Field extraction per page type.
//!
//! Every extractor is a pure function of an already parsed document, so the
//! selectors can be tested against saved markup without a network. The
//! crawler is generic over [`SiteMarkup`]; [`JalanMarkup`] is the layout of
//! the reference site.

use scraper::{ElementRef, Html, Selector};

/// Base page: the prefecture selector.
pub trait SeedMarkup {
    fn prefecture_codes(&self, doc: &Html) -> Vec<String>;
}

/// Paginated search results for one subregion.
pub trait ListingMarkup {
    /// Raw text of the total result count, if the page shows one.
    fn result_count(&self, doc: &Html) -> Option<String>;
    /// Detail hrefs in document order, unresolved.
    fn detail_links(&self, doc: &Html) -> Vec<String>;
}

pub trait DetailMarkup {
    fn hotel_name(&self, doc: &Html) -> Option<String>;
    fn price_text(&self, doc: &Html) -> Option<String>;
    fn hotel_type(&self, doc: &Html) -> Option<String>;
    /// Href of the linked map page, unresolved.
    fn map_link(&self, doc: &Html) -> Option<String>;
}

pub trait MapMarkup {
    /// The last non-blank text node of the map info block, trimmed.
    fn location(&self, doc: &Html) -> Option<String>;
}

pub trait SiteMarkup: SeedMarkup + ListingMarkup + DetailMarkup + MapMarkup + Send + Sync {}

impl<T> SiteMarkup for T where T: SeedMarkup + ListingMarkup + DetailMarkup + MapMarkup + Send + Sync {}

pub struct JalanMarkup {
    prefecture_option: Selector,
    result_count: Selector,
    detail_link: Selector,
    hotel_name: Selector,
    price: Selector,
    hotel_type: Selector,
    map_anchor: Selector,
    map_info: Selector,
}

impl JalanMarkup {
    pub fn new() -> Self {
        Self {
            prefecture_option: selector(
                r#"div[class*="areaSelect"] select[name*="kenCd"] option"#,
            ),
            result_count: selector(r#"span[class*="listInformation--count"]"#),
            detail_link: selector(r#"a[class*="planDetailLink"]"#),
            hotel_name: selector(r#"div[id*="hotel_name"] > a"#),
            price: selector(r#"div[class*="p-planOverview__charge"] p > em"#),
            hotel_type: selector(r#"div[id*="roomTypeNameId"] p span"#),
            map_anchor: selector(r#"a[target*="map"]"#),
            map_info: selector(r#"div[class*="map__yadInfo"] p"#),
        }
    }
}

impl Default for JalanMarkup {
    fn default() -> Self {
        Self::new()
    }
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("built-in selector is valid CSS")
}

impl SeedMarkup for JalanMarkup {
    fn prefecture_codes(&self, doc: &Html) -> Vec<String> {
        doc.select(&self.prefecture_option)
            .filter_map(|option| option.value().attr("value"))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl ListingMarkup for JalanMarkup {
    fn result_count(&self, doc: &Html) -> Option<String> {
        doc.select(&self.result_count)
            .flat_map(|el| el.text())
            .map(str::trim)
            .find(|text| !text.is_empty())
            .map(str::to_string)
    }

    fn detail_links(&self, doc: &Html) -> Vec<String> {
        doc.select(&self.detail_link)
            .filter_map(|a| a.value().attr("href"))
            .map(str::to_string)
            .collect()
    }
}

impl DetailMarkup for JalanMarkup {
    fn hotel_name(&self, doc: &Html) -> Option<String> {
        first_own_text(doc, &self.hotel_name)
    }

    fn price_text(&self, doc: &Html) -> Option<String> {
        first_own_text(doc, &self.price)
    }

    fn hotel_type(&self, doc: &Html) -> Option<String> {
        first_own_text(doc, &self.hotel_type)
    }

    fn map_link(&self, doc: &Html) -> Option<String> {
        doc.select(&self.map_anchor)
            .filter_map(|a| a.value().attr("onclick"))
            .find_map(map_url_from_onclick)
    }
}

impl MapMarkup for JalanMarkup {
    fn location(&self, doc: &Html) -> Option<String> {
        doc.select(&self.map_info)
            .flat_map(|p| p.text())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .last()
            .map(str::to_string)
    }
}

/// First non-blank text node sitting directly under any matching element.
fn first_own_text(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector)
        .flat_map(own_text_nodes)
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

fn own_text_nodes<'a>(element: ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    element
        .children()
        .filter_map(|child| child.value().as_text().map(|text| &**text))
}

/// Pulls the URL argument out of `window.open('/yad/map/', 'map', ...)`.
pub fn map_url_from_onclick(onclick: &str) -> Option<String> {
    let (_, after_open) = onclick.rsplit_once("open('")?;
    let url = after_open.split("',").next()?.trim();
    if url.is_empty() {
        None
    } else {
        Some(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_PAGE: &str = r#"<html><body>
        <div class="areaSelect mod-area">
          <select name="kenCd">
            <option value="">都道府県を選択</option>
            <option value="010000">北海道</option>
            <option value="130000">東京都</option>
          </select>
        </div>
        <select name="kenCd"><option value="999999">elsewhere</option></select>
    </body></html>"#;

    const LISTING_PAGE: &str = r#"<html><body>
        <p class="listInformation">全<span class="jlnpc-listInformation--count">61</span>件</p>
        <ul>
          <li><a class="jlnpc-planDetailLink s14" href="/yad111111/plan/">A</a></li>
          <li><a class="other" href="/ignored/">B</a></li>
          <li><a class="jlnpc-planDetailLink" href="/yad222222/plan/">C</a></li>
        </ul>
    </body></html>"#;

    const DETAIL_PAGE: &str = r#"<html><body>
        <div id="yado_header_hotel_name"><a href="/yad111111/">
            湯元 山の宿
        </a></div>
        <div class="p-planOverview__charge">
          <p class="price"><em>12,345</em>円〜</p>
        </div>
        <div id="roomTypeNameId_1"><p><span>和室</span><span>洋室</span></p></div>
        <a target="yadoMap" href="javascript:void(0);"
           onclick="window.open('/yad111111/map/?screenId=UWW3701', 'map', 'width=800');">地図</a>
    </body></html>"#;

    const MAP_PAGE: &str = r#"<html><body>
        <div class="jlnpc-map__yadInfo">
          <p class="name">湯元 山の宿</p>
          <p><span>住所</span>
             北海道札幌市南区定山渓温泉西4丁目
          </p>
        </div>
    </body></html>"#;

    #[test]
    fn test_prefecture_codes_skip_placeholder_and_foreign_selects() {
        let doc = Html::parse_document(BASE_PAGE);
        assert_eq!(
            JalanMarkup::new().prefecture_codes(&doc),
            vec!["010000", "130000"]
        );
    }

    #[test]
    fn test_listing_fields() {
        let markup = JalanMarkup::new();
        let doc = Html::parse_document(LISTING_PAGE);

        assert_eq!(markup.result_count(&doc).as_deref(), Some("61"));
        assert_eq!(
            markup.detail_links(&doc),
            vec!["/yad111111/plan/", "/yad222222/plan/"]
        );
    }

    #[test]
    fn test_listing_without_count() {
        let doc = Html::parse_document("<html><body><p>no results</p></body></html>");
        assert_eq!(JalanMarkup::new().result_count(&doc), None);
        assert!(JalanMarkup::new().detail_links(&doc).is_empty());
    }

    #[test]
    fn test_detail_fields() {
        let markup = JalanMarkup::new();
        let doc = Html::parse_document(DETAIL_PAGE);

        assert_eq!(markup.hotel_name(&doc).as_deref(), Some("湯元 山の宿"));
        assert_eq!(markup.price_text(&doc).as_deref(), Some("12,345"));
        assert_eq!(markup.hotel_type(&doc).as_deref(), Some("和室"));
        assert_eq!(
            markup.map_link(&doc).as_deref(),
            Some("/yad111111/map/?screenId=UWW3701")
        );
    }

    #[test]
    fn test_detail_missing_price() {
        let html = DETAIL_PAGE.replace("p-planOverview__charge", "soldOut");
        let doc = Html::parse_document(&html);
        assert_eq!(JalanMarkup::new().price_text(&doc), None);
    }

    #[test]
    fn test_map_location_is_last_text_node() {
        let doc = Html::parse_document(MAP_PAGE);
        assert_eq!(
            JalanMarkup::new().location(&doc).as_deref(),
            Some("北海道札幌市南区定山渓温泉西4丁目")
        );
    }

    #[test]
    fn test_map_url_from_onclick() {
        assert_eq!(
            map_url_from_onclick("window.open('/yad1/map/', 'map', 'w=1');").as_deref(),
            Some("/yad1/map/")
        );
        assert_eq!(
            map_url_from_onclick("openMap(); window.open('/a/','x')").as_deref(),
            Some("/a/")
        );
        assert_eq!(map_url_from_onclick("return false;"), None);
        assert_eq!(map_url_from_onclick("window.open('', 'map')"), None);
    }
}
