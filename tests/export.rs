//! Export Integration Tests
//!
//! JSON snapshot contents and file output.

use chrono::NaiveDate;
use richard::domain::{Download, MediaFormat};
use richard::{CatalogExport, CatalogStore, Category, CategoryKind, RelatedUrl, Speaker, Video};
use tempfile::TempDir;

fn sample_store() -> CatalogStore {
    let mut store = CatalogStore::open_in_memory().unwrap();
    let category = store
        .save_category(&mut Category::new(
            CategoryKind::Conference,
            "PyCon",
            "PyCon 2012",
            "pycon-2012",
        ))
        .unwrap();
    let speaker = store
        .save_speaker(&mut Speaker::from_name("Jessica McKellar"))
        .unwrap();
    let tag = store.get_or_create_tag("community").unwrap();

    let mut video = Video::new("Building an Open Source Community", category)
        .with_speaker(speaker)
        .with_tag(tag)
        .with_recorded(NaiveDate::from_ymd_opt(2012, 3, 10).unwrap())
        .with_download(
            MediaFormat::Webm,
            Download::new("http://example.com/talk.webm", Some(123_456)),
        );
    let id = store.save_video(&mut video).unwrap();
    store
        .add_related_url(
            &mut RelatedUrl::new(id, "http://example.com/slides").with_description("Slides"),
        )
        .unwrap();

    store
        .save_video(&mut Video::new("Undated Lightning Talk", category))
        .unwrap();

    store
}

#[test]
fn test_collect_inlines_related_urls() {
    let store = sample_store();
    let export = CatalogExport::collect(&store).unwrap();

    assert_eq!(export.categories.len(), 1);
    assert_eq!(export.speakers.len(), 1);
    assert_eq!(export.tags.len(), 1);
    assert_eq!(export.videos.len(), 2);

    let first = &export.videos[0];
    assert_eq!(first.video.slug, "building-an-open-source-community");
    assert_eq!(first.related_urls.len(), 1);
    assert_eq!(first.related_urls[0].description, "Slides");
    assert!(export.videos[1].related_urls.is_empty());
}

#[tokio::test]
async fn test_write_and_read_export() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("out").join("catalog.json");

    let store = sample_store();
    let export = CatalogExport::collect(&store).unwrap();
    export.write_to(&path).await.unwrap();
    assert!(path.exists());

    let raw = tokio::fs::read_to_string(&path).await.unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["version"], 1);
    assert_eq!(json["categories"][0]["kind"], "conference");
    assert_eq!(json["videos"][0]["slug"], "building-an-open-source-community");
    assert_eq!(json["videos"][0]["webm"]["length"], 123_456);
    assert_eq!(json["videos"][0]["related_urls"][0]["url"], "http://example.com/slides");

    let read_back = CatalogExport::read_from(&path).await.unwrap();
    assert_eq!(read_back.videos[0].video, export.videos[0].video);
    assert_eq!(read_back.videos[0].related_urls, export.videos[0].related_urls);
}
