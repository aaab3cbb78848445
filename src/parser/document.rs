use scraper::{ElementRef, Html, Selector};

/// Parsed page with the handful of lookups the extractor needs.
pub struct Page {
    html: Html,
}

impl Page {
    pub fn parse(raw: &str) -> Self {
        Page {
            html: Html::parse_document(raw),
        }
    }

    pub fn find_first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.html.select(selector).next()
    }

    pub fn find_all<'a>(&'a self, selector: &'a Selector) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.html.select(selector)
    }
}

pub fn first_within<'a>(el: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    el.select(selector).next()
}

/// All text under `el`, whitespace-trimmed.
pub fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

pub fn attr<'a>(el: ElementRef<'a>, name: &str) -> Option<&'a str> {
    el.value().attr(name)
}
