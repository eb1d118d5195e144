use scraper::{ElementRef, Selector};

pub fn extract_text(node: ElementRef) -> String {
    node.text().collect::<String>()
}

pub fn parse_selector(css: &str) -> anyhow::Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow::anyhow!("bad selector {css:?}: {e}"))
}
