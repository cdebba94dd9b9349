use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::account::AccountRecord;

const PLATFORMS: [&str; 4] = ["Instagram", "YouTube", "TikTok", "Telegram"];
const CATEGORIES: [&str; 5] = ["Lifestyle", "Tech", "Food", "Travel", "Education"];

/// Deterministic batch of plausible, valid accounts for demos and tests.
pub fn generate_synthetic_accounts(count: usize, seed: u64) -> Vec<AccountRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|idx| synthetic_account(&mut rng, idx))
        .collect()
}

fn synthetic_account(rng: &mut StdRng, idx: usize) -> AccountRecord {
    let subscribers = rng.gen_range(1_000.0..500_000.0_f64).round();
    let subscriptions = rng.gen_range(50.0..2_000.0_f64).round();
    let posts = rng.gen_range(4.0..60.0_f64).round();
    let post_frequency = (posts / 4.0 * rng.gen_range(0.8..1.2)).max(0.5);

    // Interactions scale with audience size and output.
    let per_post_likes = subscribers * rng.gen_range(0.005..0.08);
    let likes = (per_post_likes * posts).round().max(1.0);
    let comments = (likes * rng.gen_range(0.02..0.15)).round().max(1.0);
    let shares = (likes * rng.gen_range(0.01..0.08)).round().max(1.0);
    let avg_reach = (subscribers * rng.gen_range(0.2..1.5)).round().max(1.0);

    let engagement_rate_std = if rng.gen::<f64>() < 0.9 {
        Some(rng.gen_range(0.05..2.0))
    } else {
        None
    };
    let reach_std = if rng.gen::<f64>() < 0.9 {
        Some(avg_reach * rng.gen_range(0.05..0.6))
    } else {
        None
    };

    AccountRecord {
        id: Some(format!("synthetic_{}", idx)),
        name: format!("Creator {}", idx + 1),
        platform: PLATFORMS[rng.gen_range(0..PLATFORMS.len())].to_string(),
        category: CATEGORIES[rng.gen_range(0..CATEGORIES.len())].to_string(),
        subscribers,
        subscriptions,
        followers_growth: (subscribers * rng.gen_range(-0.02..0.12)).round(),
        posts,
        post_frequency,
        likes,
        comments,
        shares,
        avg_reach,
        mentions: rng.gen_range(0.0..60.0_f64).round(),
        engagement_rate_std,
        post_frequency_std: post_frequency * rng.gen_range(0.0..0.8),
        reach_std,
    }
}
