use scraper::Html;

use crate::text_manipulators::parse_selector;

/// The latest page we got back from the portal, plus the hidden form values
/// the next request has to echo.
pub struct PageContext {
    pub body: String,
    pub document: Html,
    pub arcv: Option<String>,
    pub funcid: Option<String>,
}

impl PageContext {
    pub fn parse(body: String) -> anyhow::Result<Self> {
        let document = Html::parse_document(&body);
        let arcv = hidden_value(&document, "arcv")?;
        let funcid = hidden_value(&document, "funcid")?;
        Ok(Self {
            body,
            document,
            arcv,
            funcid,
        })
    }
}

impl std::fmt::Debug for PageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageContext")
            .field("body_len", &self.body.len())
            .field("arcv", &self.arcv)
            .field("funcid", &self.funcid)
            .finish()
    }
}

/// `value` of the first element named `name`, if the page has one.
fn hidden_value(document: &Html, name: &str) -> anyhow::Result<Option<String>> {
    let selector = parse_selector(&format!("[name=\"{name}\"]"))?;
    Ok(document
        .select(&selector)
        .next()
        .and_then(|node| node.value().attr("value"))
        .map(str::to_string))
}
