use colored::{ColoredString, Colorize};
use futures::future::join_all;
use log::{error, info};
use munq_common::ui::single_pb;
use munq_fmp::endp::price_change::{format_change, tone, PriceChange, Tone};
use munq_fmp::prelude::*;

pub const LANDING_TICKERS: [&str; 8] = ["AAPL", "GOOG", "MSFT", "SPY", "AMZN", "META", "TSLA", "NVDA"];
pub const LOAD_FAILED: &str = "Failed to load data";

/// Loading is the only state a card ever leaves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CardState {
    Loading,
    Loaded(f64),
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub ticker: String,
    pub state: CardState,
}

impl Card {
    pub fn new(ticker: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            state: CardState::Loading,
        }
    }

    /// Applies the first outcome; later ones are ignored.
    pub fn resolve(&mut self, outcome: Result<PriceChange>) {
        if self.state != CardState::Loading {
            return;
        }
        self.state = match outcome {
            Ok(change) => CardState::Loaded(change.one_day),
            Err(e) => {
                error!("Error fetching price change for {}: {e}", self.ticker);
                CardState::Failed
            }
        };
    }

    pub fn text(&self) -> String {
        match self.state {
            CardState::Loading => "Loading...".to_string(),
            CardState::Loaded(change) => format_change(change),
            CardState::Failed => LOAD_FAILED.to_string(),
        }
    }

    pub fn render(&self) -> String {
        let text = self.text();
        let text: ColoredString = match self.state {
            CardState::Loading => text.dimmed(),
            CardState::Loaded(change) => match tone(change) {
                Tone::Positive => text.green(),
                Tone::NonPositive => text.red(),
            },
            CardState::Failed => text.yellow(),
        };
        format!("{} {text}", format!("{:<6}", self.ticker).bold())
    }
}

/// One request per ticker, all in flight at once; each card settles on its own.
pub async fn load_all(client: &Client, config: &Config, tickers: &[String]) -> Vec<Card> {
    let pb = single_pb(tickers.len() as u64);
    pb.set_message("price changes");

    let cards = join_all(tickers.iter().map(|ticker| {
        let pb = &pb;
        async move {
            let mut card = Card::new(ticker);
            card.resolve(client.price_change(config, ticker).await);
            pb.inc(1);
            card
        }
    }))
    .await;

    pb.finish_and_clear();
    let failed = cards.iter().filter(|c| c.state == CardState::Failed).count();
    info!("loaded {} price changes, {failed} failed", cards.len());
    cards
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(one_day: f64) -> PriceChange {
        serde_json::from_value(serde_json::json!({ "1D": one_day })).unwrap()
    }

    #[test]
    fn starts_loading() {
        let card = Card::new("AAPL");
        assert_eq!(card.state, CardState::Loading);
        assert_eq!(card.text(), "Loading...");
    }

    #[test]
    fn loaded_card_shows_signed_change() {
        let mut card = Card::new("AAPL");
        card.resolve(Ok(change(0.5678)));
        assert_eq!(card.state, CardState::Loaded(0.5678));
        assert_eq!(card.text(), "+0.57%");

        let mut card = Card::new("TSLA");
        card.resolve(Ok(change(-1.23)));
        assert_eq!(card.text(), "-1.23%");
    }

    #[test]
    fn failed_card_shows_the_fallback() {
        let mut card = Card::new("META");
        card.resolve(Err(Error::Api("Limit Reach".into())));
        assert_eq!(card.state, CardState::Failed);
        assert_eq!(card.text(), LOAD_FAILED);
    }

    #[test]
    fn settled_cards_do_not_change() {
        let mut card = Card::new("SPY");
        card.resolve(Err(Error::Api("Limit Reach".into())));
        card.resolve(Ok(change(2.0)));
        assert_eq!(card.state, CardState::Failed);

        let mut card = Card::new("SPY");
        card.resolve(Ok(change(2.0)));
        card.resolve(Err(Error::Api("Limit Reach".into())));
        assert_eq!(card.state, CardState::Loaded(2.0));
    }

    #[test]
    fn render_leads_with_the_ticker() {
        colored::control::set_override(false);
        let mut card = Card::new("NVDA");
        card.resolve(Ok(change(0.0)));
        assert_eq!(card.render(), "NVDA   0.00%");
    }

    #[test]
    fn landing_set_has_eight_tickers() {
        assert_eq!(LANDING_TICKERS.len(), 8);
        assert!(LANDING_TICKERS.contains(&"SPY"));
    }
}
