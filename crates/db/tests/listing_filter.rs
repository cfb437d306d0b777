//! Listing filter rendering against a real database: the row and count
//! executors must agree, and each stage must narrow as specified.

use chrono::{Duration, Utc};
use nihontowatch_core::criteria::SavedSearchCriteria;
use nihontowatch_core::currency::ExchangeRates;
use nihontowatch_core::filter::MatchOptions;
use nihontowatch_core::types::DbId;
use nihontowatch_core::url_state::{parse_query_string, SortOrder, UrlState};
use nihontowatch_core::vocab::Category;
use nihontowatch_db::filter_sql::render_filter;
use nihontowatch_db::matcher::{
    count_matching_listings, find_matching_listings, resolve_listing_filter,
};
use nihontowatch_db::repositories::ListingRepo;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

async fn seed_dealer(pool: &PgPool, name: &str) -> DbId {
    sqlx::query_scalar("INSERT INTO dealers (name, domain) VALUES ($1, $2) RETURNING id")
        .bind(name)
        .bind(format!("{}.example", name.to_lowercase().replace(' ', "-")))
        .fetch_one(pool)
        .await
        .unwrap()
}

struct Seed<'a> {
    title: &'a str,
    item_type: &'a str,
    price_jpy: Option<f64>,
    cert_type: Option<&'a str>,
    status: &'a str,
    smith: Option<&'a str>,
    artisan_id: Option<&'a str>,
    nagasa_cm: Option<f64>,
    age_days: i64,
}

impl Default for Seed<'_> {
    fn default() -> Self {
        Self {
            title: "Katana",
            item_type: "katana",
            price_jpy: Some(1_000_000.0),
            cert_type: None,
            status: "available",
            smith: None,
            artisan_id: None,
            nagasa_cm: None,
            age_days: 1,
        }
    }
}

async fn seed_listing(pool: &PgPool, dealer_id: DbId, seed: Seed<'_>) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO listings \
            (url, title, item_type, price_value, price_currency, price_jpy, cert_type, \
             status, smith, artisan_id, nagasa_cm, dealer_id, first_seen_at) \
         VALUES ($1, $2, $3, $4, 'JPY', $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING id",
    )
    .bind(format!("https://dealer.example/{}", uuid::Uuid::new_v4()))
    .bind(seed.title)
    .bind(seed.item_type)
    .bind(seed.price_jpy)
    .bind(seed.cert_type)
    .bind(seed.status)
    .bind(seed.smith)
    .bind(seed.artisan_id)
    .bind(seed.nagasa_cm)
    .bind(dealer_id)
    .bind(Utc::now() - Duration::days(seed.age_days))
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn ids_for(pool: &PgPool, state: &UrlState, options: &MatchOptions) -> (Vec<DbId>, i64) {
    let filter = resolve_listing_filter(pool, state, options, &ExchangeRates::default())
        .await
        .unwrap();
    let clause = render_filter(&filter);
    let rows = ListingRepo::find_filtered(pool, &clause, SortOrder::Recent, None, 0)
        .await
        .unwrap();
    let count = ListingRepo::count_filtered(pool, &clause).await.unwrap();
    (rows.iter().map(|l| l.id).collect(), count)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_and_count_agree(pool: PgPool) {
    let dealer = seed_dealer(&pool, "Aoi Art").await;
    for i in 0..5 {
        seed_listing(&pool, dealer, Seed { age_days: i, ..Seed::default() }).await;
    }
    seed_listing(&pool, dealer, Seed { status: "sold", ..Seed::default() }).await;
    seed_listing(&pool, dealer, Seed { item_type: "tsuba", ..Seed::default() }).await;

    let state = parse_query_string("q=katana");
    let (ids, count) = ids_for(&pool, &state, &MatchOptions::default()).await;
    assert_eq!(ids.len() as i64, count);
    assert_eq!(count, 5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_certification_variants_expand(pool: PgPool) {
    let dealer = seed_dealer(&pool, "Eirakudo").await;
    let canonical = seed_listing(&pool, dealer, Seed { cert_type: Some("Tokuju"), ..Seed::default() }).await;
    let variant = seed_listing(
        &pool,
        dealer,
        Seed { cert_type: Some("tokubetsu_juyo"), ..Seed::default() },
    )
    .await;
    seed_listing(&pool, dealer, Seed { cert_type: Some("Juyo"), ..Seed::default() }).await;

    let state = parse_query_string("cert=Tokuju");
    let (mut ids, _) = ids_for(&pool, &state, &MatchOptions::default()).await;
    ids.sort();
    assert_eq!(ids, vec![canonical, variant]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_semantic_query_and_numeric(pool: PgPool) {
    let dealer = seed_dealer(&pool, "Choshuya").await;
    let long = seed_listing(
        &pool,
        dealer,
        Seed { cert_type: Some("Juyo"), nagasa_cm: Some(72.0), ..Seed::default() },
    )
    .await;
    seed_listing(
        &pool,
        dealer,
        Seed { cert_type: Some("Juyo"), nagasa_cm: Some(65.0), ..Seed::default() },
    )
    .await;
    seed_listing(&pool, dealer, Seed { nagasa_cm: Some(75.0), ..Seed::default() }).await;

    let state = parse_query_string("q=juyo%20cm%3E70");
    let (ids, count) = ids_for(&pool, &state, &MatchOptions::default()).await;
    assert_eq!(ids, vec![long]);
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_artisan_name_resolves_to_code(pool: PgPool) {
    sqlx::query(
        "INSERT INTO artisan_index (code, name_romaji, name_normalized, kind) \
         VALUES ('MAS590', 'Masamune', 'masamune', 'smith')",
    )
    .execute(&pool)
    .await
    .unwrap();
    let dealer = seed_dealer(&pool, "Iida Koendo").await;
    // Title does not mention the name; only the attribution links it.
    let attributed = seed_listing(
        &pool,
        dealer,
        Seed { title: "Soshu tachi", artisan_id: Some("MAS590"), ..Seed::default() },
    )
    .await;
    let by_title = seed_listing(&pool, dealer, Seed { title: "Den Masamune katana", ..Seed::default() }).await;
    seed_listing(&pool, dealer, Seed { title: "Bizen katana", ..Seed::default() }).await;

    let state = parse_query_string("q=masamune");
    let (mut ids, _) = ids_for(&pool, &state, &MatchOptions::default()).await;
    ids.sort();
    assert_eq!(ids, vec![attributed, by_title]);

    let state = parse_query_string("q=mas590");
    let (ids, _) = ids_for(&pool, &state, &MatchOptions::default()).await;
    assert_eq!(ids, vec![attributed]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_text_search_folds_macrons_in_columns(pool: PgPool) {
    let dealer = seed_dealer(&pool, "Tsuruginoya").await;
    let macron = seed_listing(
        &pool,
        dealer,
        Seed { title: "Gotō Ichijō tsuba", item_type: "tsuba", ..Seed::default() },
    )
    .await;
    let plain = seed_listing(
        &pool,
        dealer,
        Seed { title: "Kozuka", item_type: "kozuka", smith: Some("Goto Mitsunobu"), ..Seed::default() },
    )
    .await;
    seed_listing(&pool, dealer, Seed { title: "Higo tsuba", item_type: "tsuba", ..Seed::default() }).await;

    for query in ["q=goto&cat=all", "q=Got%C5%8D&cat=all", "q=GOTO&cat=all"] {
        let (mut ids, count) = ids_for(&pool, &parse_query_string(query), &MatchOptions::default()).await;
        ids.sort();
        assert_eq!(ids, vec![macron, plain], "{query}");
        assert_eq!(count, 2);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_matcher_since_floor_and_limit(pool: PgPool) {
    let dealer = seed_dealer(&pool, "Seiyudo").await;
    let newest = seed_listing(&pool, dealer, Seed { age_days: 0, ..Seed::default() }).await;
    let newer = seed_listing(&pool, dealer, Seed { age_days: 1, ..Seed::default() }).await;
    let ask = seed_listing(&pool, dealer, Seed { price_jpy: None, age_days: 2, ..Seed::default() }).await;
    seed_listing(&pool, dealer, Seed { price_jpy: Some(50_000.0), age_days: 1, ..Seed::default() }).await;
    seed_listing(&pool, dealer, Seed { age_days: 30, ..Seed::default() }).await;

    let criteria = SavedSearchCriteria {
        category: Category::Nihonto,
        item_types: vec!["katana".into()],
        ..SavedSearchCriteria::default()
    };
    let since = Some(Utc::now() - Duration::days(7));
    let rates = ExchangeRates::default();

    let rows = find_matching_listings(&pool, &criteria, since, None, Some(100_000.0), &rates).await;
    let ids: Vec<DbId> = rows.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![newest, newer, ask]);
    assert_eq!(
        count_matching_listings(&pool, &criteria, since, Some(100_000.0), &rates).await,
        3
    );

    let limited = find_matching_listings(&pool, &criteria, since, Some(2), Some(100_000.0), &rates).await;
    assert_eq!(limited.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_in_memory_evaluation_matches_sql(pool: PgPool) {
    let dealer = seed_dealer(&pool, "Nipponto").await;
    seed_listing(&pool, dealer, Seed { cert_type: Some("Hozon"), ..Seed::default() }).await;
    seed_listing(&pool, dealer, Seed { cert_type: Some("hozon"), status: "sold", ..Seed::default() }).await;
    seed_listing(&pool, dealer, Seed { item_type: "wakizashi", ..Seed::default() }).await;
    seed_listing(&pool, dealer, Seed { price_jpy: None, ..Seed::default() }).await;

    let state = parse_query_string("cert=Hozon&min=500000");
    let filter = resolve_listing_filter(&pool, &state, &MatchOptions::default(), &ExchangeRates::default())
        .await
        .unwrap();
    let clause = render_filter(&filter);
    let everything = ListingRepo::find_filtered(
        &pool,
        &render_filter(&Default::default()),
        SortOrder::Recent,
        None,
        0,
    )
    .await
    .unwrap();
    let matched = ListingRepo::find_filtered(&pool, &clause, SortOrder::Recent, None, 0)
        .await
        .unwrap();

    let in_memory: Vec<DbId> = everything
        .iter()
        .filter(|l| filter.matches(&l.facts()))
        .map(|l| l.id)
        .collect();
    let in_sql: Vec<DbId> = matched.iter().map(|l| l.id).collect();
    assert_eq!(in_memory, in_sql);
    assert_eq!(in_sql.len(), 1);
}
