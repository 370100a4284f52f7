//! End-to-end pipeline integration tests.
//!
//! These tests run the full file-to-file flow with a mock LLM backend:
//! - CSV in, classified + emailed CSV out
//! - Durable classification cache reuse across runs
//! - Degraded classification-only runs without a generation client

use std::sync::Arc;

use tempfile::TempDir;

use outreach_core::{
    testing::MockLlmClient, ClassificationCache, ClassifierConfig, CompanyClassifier,
    EmailGenerator, LlmClient, ProcessingConfig, SenderConfig, SpeakerPipeline,
};

struct TestHarness {
    pipeline: SpeakerPipeline,
    client: Arc<MockLlmClient>,
    temp_dir: TempDir,
}

impl TestHarness {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let client = Arc::new(MockLlmClient::new());
        install_routing_handler(&client).await;

        let pipeline = build_pipeline(&client, &temp_dir, true);
        Self {
            pipeline,
            client,
            temp_dir,
        }
    }

    fn write_input(&self, contents: &str) -> std::path::PathBuf {
        let path = self.temp_dir.path().join("speakers.csv");
        std::fs::write(&path, contents).expect("Failed to write input");
        path
    }

    fn output_path(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("out").join("speaker_emails.csv")
    }

    fn cache_path(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("classifications.json")
    }
}

fn build_pipeline(client: &Arc<MockLlmClient>, temp_dir: &TempDir, with_generator: bool) -> SpeakerPipeline {
    let cache = ClassificationCache::load(temp_dir.path().join("classifications.json"));
    let classifier = Arc::new(CompanyClassifier::new(
        Some(Arc::clone(client) as Arc<dyn LlmClient>),
        cache,
        ClassifierConfig::default(),
    ));
    let generator_client = with_generator.then(|| Arc::clone(client) as Arc<dyn LlmClient>);
    let generator = Arc::new(EmailGenerator::new(generator_client, SenderConfig::default()));
    let config = ProcessingConfig {
        batch_size: 5,
        batch_pause_secs: 0,
        max_speakers: 10,
        ..ProcessingConfig::default()
    };
    SpeakerPipeline::new(classifier, generator, config)
}

/// Routes mock requests by prompt shape, picking the category token from the
/// company name embedded in the classification prompt.
async fn install_routing_handler(client: &MockLlmClient) {
    client
        .set_handler(|req| {
            if req.prompt.contains("Research the company") {
                Ok("Industry research text".to_string())
            } else if req.prompt.contains("Return a JSON object") {
                let token = if req.prompt.contains("DroneRival") {
                    "COMPETITOR"
                } else if req.prompt.contains("BuildCo") {
                    "BUILDER"
                } else {
                    "PARTNER"
                };
                Ok(format!(
                    r#"{{"category": "{token}", "confidence": 0.9, "reasoning": "test"}}"#
                ))
            } else if req.prompt.contains("subject line") {
                Ok("Generated subject".to_string())
            } else {
                Ok("Generated body".to_string())
            }
        })
        .await;
}

#[tokio::test]
async fn test_file_to_file_run() {
    let harness = TestHarness::new().await;
    let input = harness.write_input(
        "name,title,company\n\
         Ada,CTO,BuildCo\n\
         Mallory,CEO,DroneRival\n\
         Grace,Admiral,Navy Systems\n",
    );
    let output = harness.output_path();

    let summary = harness
        .pipeline
        .process_file(&input, &output, None)
        .await
        .expect("Pipeline run failed");

    assert_eq!(summary.total, 3);
    assert_eq!(summary.emails_generated, 2);
    assert_eq!(summary.competitors_excluded, 1);
    assert_eq!(summary.errored, 0);
    assert_eq!(summary.category_counts.get("Builder"), Some(&1));
    assert_eq!(summary.category_counts.get("Competitor"), Some(&1));
    assert_eq!(summary.category_counts.get("Partner"), Some(&1));

    let contents = std::fs::read_to_string(&output).unwrap();
    let mut lines = contents.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Speaker Name,Speaker Title,Speaker Company,Company Category,Email Subject,Email Body"
    );
    // Input order preserved
    assert!(lines.next().unwrap().starts_with("Ada,"));
    assert!(lines.next().unwrap().contains("N/A - Competitor"));
    assert!(lines.next().unwrap().starts_with("Grace,"));
}

#[tokio::test]
async fn test_cache_survives_across_runs() {
    let harness = TestHarness::new().await;
    let input = harness.write_input("name,title,company\nAda,CTO,BuildCo\n");
    let output = harness.output_path();

    harness
        .pipeline
        .process_file(&input, &output, None)
        .await
        .unwrap();

    assert!(harness.cache_path().exists());
    let calls_after_first_run = harness.client.call_count().await;

    // A fresh pipeline over the same cache file classifies without any
    // research or classification calls
    let second = build_pipeline(&harness.client, &harness.temp_dir, true);
    let input2 = harness
        .temp_dir
        .path()
        .join("speakers2.csv");
    std::fs::write(&input2, "name,title,company\nBob,VP,BuildCo\n").unwrap();
    let output2 = harness.temp_dir.path().join("out").join("second.csv");

    let summary = second.process_file(&input2, &output2, None).await.unwrap();
    assert_eq!(summary.category_counts.get("Builder"), Some(&1));

    // Only the two email calls were added
    assert_eq!(harness.client.call_count().await, calls_after_first_run + 2);
}

#[tokio::test]
async fn test_classification_only_run_without_generator() {
    let temp_dir = TempDir::new().unwrap();
    let client = Arc::new(MockLlmClient::new());
    install_routing_handler(&client).await;
    let pipeline = build_pipeline(&client, &temp_dir, false);

    let input = temp_dir.path().join("speakers.csv");
    std::fs::write(&input, "name,title,company\nAda,CTO,BuildCo\n").unwrap();
    let output = temp_dir.path().join("emails.csv");

    let summary = pipeline.process_file(&input, &output, None).await.unwrap();
    assert_eq!(summary.total, 1);
    assert_eq!(summary.emails_generated, 0);
    assert_eq!(summary.errored, 0);

    let contents = std::fs::read_to_string(&output).unwrap();
    assert!(contents.contains("Ada,CTO,BuildCo,Builder,N/A,N/A"));
}

#[tokio::test]
async fn test_duplicate_rows_collapse_before_processing() {
    let harness = TestHarness::new().await;
    let input = harness.write_input(
        "name,title,company\n\
         Ada,CTO,BuildCo\n\
         ada, cto ,buildco\n",
    );
    let output = harness.output_path();

    let summary = harness
        .pipeline
        .process_file(&input, &output, None)
        .await
        .unwrap();
    assert_eq!(summary.total, 1);
}
