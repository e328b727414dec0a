//! Seed data served when the generative model cannot produce usable output.
//!
//! Prices are jittered on every call to simulate a live market; news is a
//! fixed pair of stories dated relative to the call.

use rand::Rng;
use time::{Date, OffsetDateTime};

use crate::locale::LocalizedText;
use crate::model::{NewsItem, PriceQuote, Trend};

/// Largest absolute offset applied to a seed price, in rupees.
pub const PRICE_JITTER: i64 = 50;

struct SeedPrice {
    crop: (&'static str, &'static str),
    market: (&'static str, &'static str),
    price: u64,
    trend: Trend,
}

const SEED_PRICES: [SeedPrice; 6] = [
    SeedPrice {
        crop: ("Rice (Paddy)", "நெல் (பருவம்)"),
        market: ("Thanjavur", "தஞ்சாவூர்"),
        price: 2300,
        trend: Trend::Up,
    },
    SeedPrice {
        crop: ("Cotton", "பருத்தி"),
        market: ("Coimbatore", "கோயம்புத்தூர்"),
        price: 6750,
        trend: Trend::Down,
    },
    SeedPrice {
        crop: ("Turmeric", "மஞ்சள்"),
        market: ("Erode", "ஈரோடு"),
        price: 9600,
        trend: Trend::Up,
    },
    SeedPrice {
        crop: ("Coconut", "தேங்காய்"),
        market: ("Pollachi", "பொள்ளாச்சி"),
        price: 11800,
        trend: Trend::Down,
    },
    SeedPrice {
        crop: ("Tomato", "தக்காளி"),
        market: ("Ottanchatram", "ஒட்டன்சத்திரம்"),
        price: 2200,
        trend: Trend::Up,
    },
    SeedPrice {
        crop: ("Onion", "வெங்காயம்"),
        market: ("Dindigul", "திண்டுக்கல்"),
        price: 2600,
        trend: Trend::Up,
    },
];

/// The unperturbed seed quotes.
pub fn seed_prices() -> Vec<PriceQuote> {
    SEED_PRICES
        .iter()
        .zip(1u32..)
        .map(|(seed, id)| PriceQuote {
            id,
            crop: LocalizedText::new(seed.crop.0, seed.crop.1),
            market: LocalizedText::new(seed.market.0, seed.market.1),
            price: seed.price,
            trend: seed.trend,
        })
        .collect()
}

/// Seed quotes with fresh market noise, using the thread-local RNG.
pub fn fallback_prices() -> Vec<PriceQuote> {
    fallback_prices_with(&mut rand::thread_rng())
}

/// Seed quotes with each price moved by a uniform offset in
/// `[-PRICE_JITTER, PRICE_JITTER]` (floored at zero) and the trend redrawn
/// uniformly.
pub fn fallback_prices_with<R: Rng + ?Sized>(rng: &mut R) -> Vec<PriceQuote> {
    seed_prices()
        .into_iter()
        .map(|mut quote| {
            let offset = rng.gen_range(-PRICE_JITTER..=PRICE_JITTER);
            quote.price = quote.price.saturating_add_signed(offset);
            quote.trend = Trend::ALL[rng.gen_range(0..Trend::ALL.len())];
            quote
        })
        .collect()
}

/// The fixed news pair, dated today and yesterday (UTC).
pub fn fallback_news() -> Vec<NewsItem> {
    fallback_news_on(OffsetDateTime::now_utc().date())
}

/// The fixed news pair relative to `today`.
pub fn fallback_news_on(today: Date) -> Vec<NewsItem> {
    let yesterday = today.previous_day().unwrap_or(today);
    vec![
        NewsItem {
            id: 1,
            title: LocalizedText::new(
                "Govt Increases MSP for Kharif Crops",
                "காரீஃப் பயிர்களுக்கான குறைந்தபட்ச ஆதரவு விலையை அரசு உயர்த்தியது",
            ),
            summary: LocalizedText::new(
                "The Cabinet has approved a hike in MSP for paddy and other Kharif crops for the 2024-25 season.",
                "2024-25 பருவத்திற்கான நெல் மற்றும் பிற காரீஃப் பயிர்களுக்கான குறைந்தபட்ச ஆதரவு விலையை உயர்த்த அமைச்சரவை ஒப்புதல் அளித்துள்ளது.",
            ),
            date: today,
            source_url: None,
        },
        NewsItem {
            id: 2,
            title: LocalizedText::new(
                "Heavy Rains Predicted in Delta Districts",
                "டெல்டா மாவட்டங்களில் கனமழை பெய்ய வாய்ப்பு",
            ),
            summary: LocalizedText::new(
                "IMD has issued an orange alert for Thanjavur, Tiruvarur, and Nagapattinam districts.",
                "தஞ்சாவூர், திருவாரூர் மற்றும் நாகப்பட்டினம் மாவட்டங்களுக்கு வானிலை ஆய்வு மையம் ஆரஞ்சு எச்சரிக்கை விடுத்துள்ளது.",
            ),
            date: yesterday,
            source_url: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Locale;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use time::macros::date;

    #[test]
    fn seed_table_has_six_complete_quotes() {
        let seeds = seed_prices();
        assert_eq!(seeds.len(), 6);
        let ids: HashSet<u32> = seeds.iter().map(|q| q.id).collect();
        assert_eq!(ids.len(), 6);
        assert!(seeds
            .iter()
            .all(|q| q.crop.is_complete() && q.market.is_complete()));
    }

    #[test]
    fn fallback_prices_stay_within_jitter() {
        let seeds = seed_prices();
        for _ in 0..500 {
            let quotes = fallback_prices();
            assert_eq!(quotes.len(), seeds.len());
            for (quote, seed) in quotes.iter().zip(&seeds) {
                assert_eq!(quote.id, seed.id);
                assert_eq!(quote.crop, seed.crop);
                assert_eq!(quote.market, seed.market);
                let delta = quote.price as i64 - seed.price as i64;
                assert!(delta.abs() <= PRICE_JITTER, "delta {} out of range", delta);
                assert!(Trend::ALL.contains(&quote.trend));
            }
        }
    }

    #[test]
    fn fallback_prices_vary_between_calls() {
        let mut rng = StdRng::seed_from_u64(7);
        let samples: HashSet<u64> = (0..50)
            .map(|_| fallback_prices_with(&mut rng)[0].price)
            .collect();
        assert!(samples.len() > 1);
    }

    #[test]
    fn every_trend_is_drawn() {
        let mut rng = StdRng::seed_from_u64(42);
        let trends: HashSet<Trend> = (0..50)
            .flat_map(|_| fallback_prices_with(&mut rng))
            .map(|q| q.trend)
            .collect();
        assert_eq!(trends.len(), 3);
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let a = fallback_prices_with(&mut StdRng::seed_from_u64(3));
        let b = fallback_prices_with(&mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn fallback_news_is_dated_today_and_yesterday() {
        let news = fallback_news_on(date!(2024 - 03 - 01));
        assert_eq!(news.len(), 2);
        assert_eq!(news[0].date, date!(2024 - 03 - 01));
        assert_eq!(news[1].date, date!(2024 - 02 - 29));
        assert_eq!(
            news[1].title.get(Locale::English),
            Some("Heavy Rains Predicted in Delta Districts")
        );
        assert!(news.iter().all(|n| n.title.is_complete() && n.summary.is_complete()));
    }

    #[test]
    fn fallback_news_is_stable_for_a_given_day() {
        let today = date!(2025 - 01 - 15);
        assert_eq!(fallback_news_on(today), fallback_news_on(today));
    }
}
