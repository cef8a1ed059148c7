//! Page navigation as an explicit state machine.

use crate::catalog::Section;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    Analysis,
    Section(Section),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    OpenAnalysis,
    OpenSection(Section),
    BackToAnalysis,
    BackToHome,
}

impl Page {
    /// Next page for `event`. Pairs without a transition keep the page.
    pub fn apply(self, event: NavEvent) -> Page {
        match (self, event) {
            (Page::Home, NavEvent::OpenAnalysis) => Page::Analysis,
            (Page::Analysis, NavEvent::OpenSection(section)) => Page::Section(section),
            (Page::Analysis, NavEvent::BackToHome) => Page::Home,
            (Page::Section(_), NavEvent::BackToAnalysis) => Page::Analysis,
            (page, _) => page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_and_back() {
        let page = Page::default();
        assert_eq!(page, Page::Home);

        let page = page.apply(NavEvent::OpenAnalysis);
        assert_eq!(page, Page::Analysis);

        let page = page.apply(NavEvent::OpenSection(Section::RevenueProfit));
        assert_eq!(page, Page::Section(Section::RevenueProfit));

        let page = page.apply(NavEvent::BackToAnalysis);
        assert_eq!(page, Page::Analysis);

        assert_eq!(page.apply(NavEvent::BackToHome), Page::Home);
    }

    #[test]
    fn unrelated_events_keep_the_page() {
        let home = Page::Home;
        assert_eq!(home.apply(NavEvent::BackToAnalysis), Page::Home);
        assert_eq!(home.apply(NavEvent::BackToHome), Page::Home);
        assert_eq!(home.apply(NavEvent::OpenSection(Section::CustomerOrders)), Page::Home);

        let section = Page::Section(Section::OperationalInsights);
        assert_eq!(section.apply(NavEvent::OpenAnalysis), section);
        assert_eq!(section.apply(NavEvent::BackToHome), section);
        assert_eq!(
            section.apply(NavEvent::OpenSection(Section::CustomerOrders)),
            section
        );

        assert_eq!(Page::Analysis.apply(NavEvent::OpenAnalysis), Page::Analysis);
        assert_eq!(Page::Analysis.apply(NavEvent::BackToAnalysis), Page::Analysis);
    }
}
