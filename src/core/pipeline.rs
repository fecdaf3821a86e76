use crate::core::extractor::RecordExtractor;
use crate::core::merger::GroupAccumulator;
use crate::core::retention::{apply_retention, artifact_name, is_artifact_name};
use crate::core::serializer::{render_inclusion_list, ListMetadata};
use crate::core::tracker::{advance, latest_per_zone, needs_regeneration, newest_publication};
use crate::core::{
    ArtifactStore, ConfigProvider, DocumentDirectory, DocumentTextProvider, Pipeline, StateStore,
};
use crate::domain::model::{DocumentRef, PublicationTag, ZoneGroup};
use crate::utils::error::{InclusionError, Result};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use std::collections::BTreeMap;

pub struct InclusionPipeline<D, T, S, A, C>
where
    D: DocumentDirectory,
    T: DocumentTextProvider,
    S: StateStore,
    A: ArtifactStore,
    C: ConfigProvider,
{
    directory: D,
    texts: T,
    state: S,
    artifacts: A,
    config: C,
    extractor: RecordExtractor,
}

impl<D, T, S, A, C> InclusionPipeline<D, T, S, A, C>
where
    D: DocumentDirectory,
    T: DocumentTextProvider,
    S: StateStore,
    A: ArtifactStore,
    C: ConfigProvider,
{
    pub fn new(directory: D, texts: T, state: S, artifacts: A, config: C) -> Self {
        Self {
            directory,
            texts,
            state,
            artifacts,
            config,
            extractor: RecordExtractor::default(),
        }
    }

    pub fn with_extractor(mut self, extractor: RecordExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn artifacts(&self) -> &A {
        &self.artifacts
    }

    /// 保留策略是盡力而為，失敗只記錄
    async fn prune(&self, today: NaiveDate) {
        if let Err(e) = apply_retention(&self.artifacts, today).await {
            tracing::warn!("⚠️  Retention pass skipped: {}", e);
        }
    }

    async fn select_documents(&self) -> Result<BTreeMap<String, DocumentRef>> {
        let documents = self.directory.list_documents().await?;
        tracing::debug!("Directory listed {} document(s)", documents.len());
        if documents.is_empty() {
            return Err(InclusionError::NoDocumentsFound {
                message: "directory returned an empty listing".to_string(),
            });
        }
        Ok(latest_per_zone(documents))
    }

    async fn build_groups(&self, selected: &BTreeMap<String, DocumentRef>) -> Result<Vec<ZoneGroup>> {
        let mut zones: Vec<&DocumentRef> = selected.values().collect();
        zones.sort_by_key(|doc| doc.zone_name.to_lowercase());

        let mut accumulator = GroupAccumulator::new();
        for doc in zones {
            tracing::debug!("📄 {}: fetching {}", doc.zone_name, doc.file_stem());
            let text = self
                .texts
                .fetch_text(doc)
                .await
                .map_err(|e| match e {
                    InclusionError::DocumentFetchFailed { .. } => e,
                    other => InclusionError::DocumentFetchFailed {
                        zone: doc.zone_name.clone(),
                        message: other.to_string(),
                    },
                })?;

            let lines = self.extractor.extract(&doc.zone_name, &text);
            let group = accumulator.add_zone(&doc.zone_name, &lines);
            tracing::info!(
                "📡 {}: {} line(s) matched, {} usable range(s)",
                doc.zone_name,
                lines.len(),
                group.ranges.len()
            );
        }

        Ok(accumulator.finish(self.config.free_group_name()))
    }

    async fn write_artifact(&self, publication: PublicationTag, groups: &[ZoneGroup]) -> Result<String> {
        let meta = ListMetadata {
            list_name: self.config.list_name(),
            machine: self.config.machine(),
            generated_at: Local::now(),
        };
        let xml = render_inclusion_list(&meta, groups);
        let name = artifact_name(publication);

        tracing::debug!("Writing {} ({} bytes)", name, xml.len());
        self.artifacts.write(&name, xml.as_bytes()).await?;
        Ok(name)
    }
}

#[async_trait]
impl<D, T, S, A, C> Pipeline for InclusionPipeline<D, T, S, A, C>
where
    D: DocumentDirectory,
    T: DocumentTextProvider,
    S: StateStore,
    A: ArtifactStore,
    C: ConfigProvider,
{
    /// 目前存在、符合命名規則的檔案（已排序）
    async fn list_artifacts(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .artifacts
            .list_names()
            .await?
            .into_iter()
            .filter(|name| is_artifact_name(name))
            .collect();
        names.sort();
        Ok(names)
    }

    /// 檢查是否有新的發佈期別，必要時重新產生清單；回傳是否產生了新檔案
    async fn run_pipeline(&self, today: NaiveDate) -> Result<bool> {
        // 上游暫時無法讀取時不動任何本地狀態
        let selected = match self.select_documents().await {
            Ok(selected) => selected,
            Err(e) if e.is_no_change() => {
                tracing::warn!("⚠️  {}; treating run as unchanged", e);
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let Some(publication) = newest_publication(selected.values()) else {
            return Ok(false);
        };
        let new_identifier = publication.to_string();

        let state = self.state.load().await?;
        if !needs_regeneration(&new_identifier, state.latest_publication.as_deref()) {
            tracing::info!("✅ Publication {} already generated, nothing to do", new_identifier);
            self.prune(today).await;
            return Ok(false);
        }

        tracing::info!(
            "🆕 New publication {} (previous: {}), regenerating from {} zone(s)",
            new_identifier,
            state.latest_publication.as_deref().unwrap_or("none"),
            selected.len()
        );

        let groups = self.build_groups(&selected).await?;
        let name = self.write_artifact(publication, &groups).await?;

        let next_state = advance(&state, publication, Local::now());
        self.state.save(&next_state).await?;
        tracing::info!("📁 Wrote {} and recorded publication {}", name, new_identifier);

        self.prune(today).await;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::PublicationState;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    struct StaticDirectory {
        documents: Option<Vec<DocumentRef>>,
    }

    #[async_trait]
    impl DocumentDirectory for StaticDirectory {
        async fn list_documents(&self) -> Result<Vec<DocumentRef>> {
            self.documents
                .clone()
                .ok_or_else(|| InclusionError::SourceUnavailable {
                    message: "connection refused".to_string(),
                })
        }
    }

    struct StaticTexts {
        texts: HashMap<String, String>,
    }

    #[async_trait]
    impl DocumentTextProvider for StaticTexts {
        async fn fetch_text(&self, document: &DocumentRef) -> Result<String> {
            self.texts
                .get(&document.locator)
                .cloned()
                .ok_or_else(|| InclusionError::HttpError(reqwest_error()))
        }
    }

    // 只用來產生一個 reqwest::Error
    fn reqwest_error() -> reqwest::Error {
        reqwest::Client::new()
            .get("not a url")
            .build()
            .expect_err("invalid url must fail")
    }

    #[derive(Clone, Default)]
    struct MemoryState {
        state: Arc<Mutex<PublicationState>>,
        saves: Arc<Mutex<usize>>,
    }

    #[async_trait]
    impl StateStore for MemoryState {
        async fn load(&self) -> Result<PublicationState> {
            Ok(self.state.lock().await.clone())
        }

        async fn save(&self, state: &PublicationState) -> Result<()> {
            *self.state.lock().await = state.clone();
            *self.saves.lock().await += 1;
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct MemoryArtifacts {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        read_only: bool,
    }

    impl MemoryArtifacts {
        async fn get(&self, name: &str) -> Option<String> {
            let files = self.files.lock().await;
            files.get(name).map(|b| String::from_utf8_lossy(b).into_owned())
        }
    }

    #[async_trait]
    impl ArtifactStore for MemoryArtifacts {
        async fn list_names(&self) -> Result<Vec<String>> {
            Ok(self.files.lock().await.keys().cloned().collect())
        }

        async fn write(&self, name: &str, data: &[u8]) -> Result<()> {
            if self.read_only {
                return Err(InclusionError::SerializationIo {
                    name: name.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
                });
            }
            self.files.lock().await.insert(name.to_string(), data.to_vec());
            Ok(())
        }

        async fn delete(&self, name: &str) -> Result<()> {
            self.files.lock().await.remove(name);
            Ok(())
        }
    }

    struct TestConfig;

    impl ConfigProvider for TestConfig {
        fn list_name(&self) -> &str {
            "Test list"
        }

        fn free_group_name(&self) -> &str {
            "Vrije frequenties"
        }

        fn machine(&self) -> &str {
            "test-host"
        }
    }

    fn doc(zone: &str, code: &str, yy: u8, q: u8) -> DocumentRef {
        DocumentRef {
            zone_name: zone.to_string(),
            code: code.to_string(),
            lang: "NL".to_string(),
            year_suffix: yy,
            quarter: q,
            locator: format!("mem://{}-NL-{:02}-{}", code, yy, q),
        }
    }

    fn two_zone_fixture() -> (StaticDirectory, StaticTexts) {
        let directory = StaticDirectory {
            documents: Some(vec![doc("A", "AAA", 24, 3), doc("A", "AAA", 24, 4), doc("B", "BBB", 24, 4)]),
        };
        let mut texts = HashMap::new();
        texts.insert(
            "mem://AAA-NL-24-4".to_string(),
            "100,000 101,000 OK\n101,000 102,000 OK vrijgesteld\n".to_string(),
        );
        texts.insert("mem://BBB-NL-24-4".to_string(), "200 201 OK\n".to_string());
        (directory, StaticTexts { texts })
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 15).unwrap()
    }

    fn group_ranges(xml: &str, group: &str) -> Vec<(u64, u64)> {
        let marker = format!("name=\"{}\"", group);
        let start = xml.find(&marker).expect("group present");
        let body = &xml[start..];
        let body = &body[..body.find("</inclusion_group>").unwrap()];
        let values: Vec<u64> = body
            .split("<f>")
            .skip(1)
            .map(|s| s[..s.find("</f>").unwrap()].parse().unwrap())
            .collect();
        values.chunks(2).map(|c| (c[0], c[1])).collect()
    }

    #[tokio::test]
    async fn test_end_to_end_two_zones() {
        let (directory, texts) = two_zone_fixture();
        let state = MemoryState::default();
        let artifacts = MemoryArtifacts::default();
        let pipeline =
            InclusionPipeline::new(directory, texts, state.clone(), artifacts.clone(), TestConfig);

        assert!(pipeline.run_pipeline(today()).await.unwrap());

        let xml = artifacts.get("bipt_inclusion_list_2024_Q4.ils").await.unwrap();
        assert_eq!(group_ranges(&xml, "A"), vec![(100_000, 102_000)]);
        assert_eq!(group_ranges(&xml, "B"), vec![(200_000, 201_000)]);
        assert_eq!(group_ranges(&xml, "Vrije frequenties"), vec![(101_000, 102_000)]);

        // 免權利金群組放在最後
        let pos = |name: &str| xml.find(&format!("name=\"{}\"", name)).unwrap();
        assert!(pos("A") < pos("B"));
        assert!(pos("B") < pos("Vrije frequenties"));

        let saved = state.state.lock().await.clone();
        assert_eq!(saved.latest_publication.as_deref(), Some("2024_Q4"));
        assert!(saved.latest_publication_ts.is_some());
    }

    #[tokio::test]
    async fn test_second_run_is_noop() {
        let (directory, texts) = two_zone_fixture();
        let state = MemoryState::default();
        let artifacts = MemoryArtifacts::default();
        let pipeline =
            InclusionPipeline::new(directory, texts, state.clone(), artifacts.clone(), TestConfig);

        assert!(pipeline.run_pipeline(today()).await.unwrap());
        let before = state.state.lock().await.clone();

        assert!(!pipeline.run_pipeline(today()).await.unwrap());
        assert_eq!(*state.state.lock().await, before);
        assert_eq!(*state.saves.lock().await, 1);
        assert_eq!(
            pipeline.list_artifacts().await.unwrap(),
            vec!["bipt_inclusion_list_2024_Q4.ils".to_string()]
        );
    }

    #[tokio::test]
    async fn test_noop_run_still_prunes() {
        let (directory, texts) = two_zone_fixture();
        let state = MemoryState::default();
        state.state.lock().await.latest_publication = Some("2024_Q4".to_string());
        let artifacts = MemoryArtifacts::default();
        artifacts
            .files
            .lock()
            .await
            .insert("bipt_inclusion_list_2024_Q2.ils".to_string(), vec![]);
        let pipeline =
            InclusionPipeline::new(directory, texts, state, artifacts.clone(), TestConfig);

        assert!(!pipeline.run_pipeline(today()).await.unwrap());
        assert!(pipeline.list_artifacts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_source_outage_leaves_everything_untouched() {
        let (_, texts) = two_zone_fixture();
        let state = MemoryState::default();
        let artifacts = MemoryArtifacts::default();
        artifacts
            .files
            .lock()
            .await
            .insert("bipt_inclusion_list_2020_Q1.ils".to_string(), vec![]);
        let pipeline = InclusionPipeline::new(
            StaticDirectory { documents: None },
            texts,
            state.clone(),
            artifacts.clone(),
            TestConfig,
        );

        assert!(!pipeline.run_pipeline(today()).await.unwrap());
        assert_eq!(*state.saves.lock().await, 0);
        // 沒有進行保留策略
        assert!(artifacts.get("bipt_inclusion_list_2020_Q1.ils").await.is_some());

        let empty = InclusionPipeline::new(
            StaticDirectory { documents: Some(vec![]) },
            StaticTexts { texts: HashMap::new() },
            state.clone(),
            artifacts,
            TestConfig,
        );
        assert!(!empty.run_pipeline(today()).await.unwrap());
        assert_eq!(*state.saves.lock().await, 0);
    }

    #[tokio::test]
    async fn test_document_failure_aborts_run() {
        let (directory, _) = two_zone_fixture();
        let state = MemoryState::default();
        let artifacts = MemoryArtifacts::default();
        let pipeline = InclusionPipeline::new(
            directory,
            StaticTexts { texts: HashMap::new() },
            state.clone(),
            artifacts.clone(),
            TestConfig,
        );

        let err = pipeline.run_pipeline(today()).await.unwrap_err();
        assert!(matches!(err, InclusionError::DocumentFetchFailed { ref zone, .. } if zone == "A"));
        assert_eq!(*state.saves.lock().await, 0);
        assert!(pipeline.list_artifacts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_keeps_previous_state() {
        let (directory, texts) = two_zone_fixture();
        let state = MemoryState::default();
        state.state.lock().await.latest_publication = Some("2024_Q3".to_string());
        let artifacts = MemoryArtifacts {
            read_only: true,
            ..Default::default()
        };
        let pipeline = InclusionPipeline::new(directory, texts, state.clone(), artifacts, TestConfig);

        let err = pipeline.run_pipeline(today()).await.unwrap_err();
        assert!(matches!(err, InclusionError::SerializationIo { .. }));
        assert_eq!(
            state.state.lock().await.latest_publication.as_deref(),
            Some("2024_Q3")
        );
    }

    #[tokio::test]
    async fn test_older_publication_still_regenerates() {
        let (directory, texts) = two_zone_fixture();
        let state = MemoryState::default();
        state.state.lock().await.latest_publication = Some("2025_Q1".to_string());
        let artifacts = MemoryArtifacts::default();
        let pipeline =
            InclusionPipeline::new(directory, texts, state.clone(), artifacts.clone(), TestConfig);

        assert!(pipeline.run_pipeline(today()).await.unwrap());
        assert_eq!(
            state.state.lock().await.latest_publication.as_deref(),
            Some("2024_Q4")
        );
    }
}
