use async_trait::async_trait;
use qbank_module_builder::error::{CatalogError, FetchError};
use qbank_module_builder::models::{write_json, Dataset, QuotaTable};
use qbank_module_builder::services::{CatalogFetcher, DetailFetcher, ProgressRange};
use qbank_module_builder::utils::logging;
use qbank_module_builder::{
    build_module_plan, BankAssembler, CandidateSummary, Config, DetailPayload, Difficulty,
    FetchDispatcher, LookupKey, ModuleSampler, Progress, QbankClient, Section, SectionFlow,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// 生成一个部分的目录：每个 (知识点, 难度) 若干题，查询键交替使用 ibn / external_id / 无
struct StubCatalog;

fn section_catalog(section: Section) -> Vec<CandidateSummary> {
    let (skills, per_cell): (&[&str], usize) = match section {
        Section::Reading => (&["CID", "INF", "COE", "WIC", "TSP", "CTC", "SYN", "TRA", "BOU", "FSS"], 4),
        Section::Math => (&["H.A.", "H.B.", "P.C.", "Q.A.", "S.A."], 6),
    };

    let mut summaries = Vec::new();
    let mut n = 0;
    for skill in skills {
        for difficulty in Difficulty::ALL {
            for _ in 0..per_cell {
                let id = format!("{}-{:03}", section, n);
                let mut summary = CandidateSummary {
                    question_id: Some(id.clone()),
                    difficulty: Some(difficulty),
                    skill_code: Some(skill.to_string()),
                    program: Some("SAT".to_string()),
                    ..Default::default()
                };
                match n % 3 {
                    0 => summary.ibn = Some(format!("ibn-{}", id)),
                    1 => summary.external_id = Some(format!("ext-{}", id)),
                    _ => {}
                }
                summaries.push(summary);
                n += 1;
            }
        }
    }

    // 缺少 questionId 的记录应被丢弃
    summaries.push(CandidateSummary {
        skill_code: Some("CID".to_string()),
        ..Default::default()
    });
    summaries
}

#[async_trait]
impl CatalogFetcher for StubCatalog {
    async fn fetch_catalog(&self, section: Section) -> Result<Vec<CandidateSummary>, CatalogError> {
        Ok(section_catalog(section))
    }
}

/// 以 "-007" 之类结尾为 7 的倍数的键模拟失败
struct StubDetails {
    calls: AtomicUsize,
}

#[async_trait]
impl DetailFetcher for StubDetails {
    async fn fetch_detail(&self, key: &LookupKey) -> Result<DetailPayload, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let number: usize = key
            .value()
            .rsplit('-')
            .next()
            .and_then(|n| n.parse().ok())
            .unwrap_or(0);
        if number % 7 == 0 {
            return Err(FetchError::Http { status: 404 });
        }
        match key {
            LookupKey::ByIbn(ibn) => Ok(serde_json::from_value(json!([{
                "body": "passage",
                "prompt": ibn,
                "answer": { "style": "Multiple Choice", "choices": { "a": { "body": "x" } }, "correct": "a" }
            }]))
            .unwrap()),
            LookupKey::ByExternalId(id) => Ok(serde_json::from_value(json!({
                "stem": id,
                "correct_answer": ["A"]
            }))
            .unwrap()),
        }
    }
}

/// 目录接口失败的部分
struct FailingCatalog;

#[async_trait]
impl CatalogFetcher for FailingCatalog {
    async fn fetch_catalog(&self, section: Section) -> Result<Vec<CandidateSummary>, CatalogError> {
        Err(CatalogError::BadStatus {
            section,
            status: 503,
        })
    }
}

fn assembler(
    catalog: Arc<dyn CatalogFetcher>,
    details: Arc<dyn DetailFetcher>,
    cancel: CancellationToken,
) -> BankAssembler {
    let dispatcher = FetchDispatcher::new(details, 4).with_cancellation(cancel);
    BankAssembler::new(SectionFlow::new(catalog, dispatcher, None))
}

#[tokio::test]
async fn test_assemble_and_build_modules() {
    let details = Arc::new(StubDetails {
        calls: AtomicUsize::new(0),
    });
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let progress = Progress::new(Arc::new(move |percent: u8, _: &str| {
        recorder.lock().unwrap().push(percent);
    }));

    let bank = assembler(Arc::new(StubCatalog), details.clone(), CancellationToken::new())
        .assemble(&progress)
        .await
        .unwrap();

    // 120 道阅读 + 90 道数学，孤立记录被丢弃
    assert_eq!(bank.questions.len(), 210);
    assert_eq!(bank.reports.len(), 2);
    assert!(bank.reports.iter().all(|r| r.dropped == 1));

    // 只有带查询键的题目发出请求
    assert_eq!(details.calls.load(Ordering::SeqCst), 80 + 60);

    let failed = &bank.questions["reading-000"];
    assert!(failed.details.is_none());
    let with_ibn = &bank.questions["reading-003"];
    assert!(matches!(with_ibn.details, Some(DetailPayload::ListStyle(_))));
    let with_ext = &bank.questions["math-001"];
    assert_eq!(
        with_ext.details.as_ref().and_then(|d| d.stem()),
        Some("ext-math-001")
    );
    let without_key = &bank.questions["math-002"];
    assert!(without_key.details.is_none());

    let percents = seen.lock().unwrap().clone();
    assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(percents.last(), Some(&95));

    let plan = build_module_plan(&bank, &QuotaTable::default(), &mut ModuleSampler::with_seed(42))
        .unwrap();
    assert_eq!(plan.modules.len(), 4);
    assert_eq!(plan.total_questions(), 27 + 27 + 22 + 22);
    for selection in &plan.modules {
        for id in &selection.question_ids {
            assert!(bank.questions.contains_key(id));
            assert!(id.starts_with(selection.section.name()));
        }
    }
}

#[tokio::test]
async fn test_same_seed_gives_same_plan() {
    let details: Arc<dyn DetailFetcher> = Arc::new(StubDetails {
        calls: AtomicUsize::new(0),
    });
    let bank = assembler(Arc::new(StubCatalog), details, CancellationToken::new())
        .assemble(&Progress::silent())
        .await
        .unwrap();

    let quotas = QuotaTable::default();
    let first = build_module_plan(&bank, &quotas, &mut ModuleSampler::with_seed(9)).unwrap();
    let second = build_module_plan(&bank, &quotas, &mut ModuleSampler::with_seed(9)).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_cancelled_run_keeps_every_question() {
    let details = Arc::new(StubDetails {
        calls: AtomicUsize::new(0),
    });
    let cancel = CancellationToken::new();
    cancel.cancel();

    let bank = assembler(Arc::new(StubCatalog), details.clone(), cancel)
        .assemble(&Progress::silent())
        .await
        .unwrap();

    assert_eq!(bank.questions.len(), 210);
    assert!(bank.questions.values().all(|q| q.details.is_none()));
    assert_eq!(details.calls.load(Ordering::SeqCst), 0);
    assert!(bank.reports.iter().all(|r| r.details.cancelled == r.details.total));
}

#[tokio::test]
async fn test_catalog_failure_aborts_assembly() {
    let details: Arc<dyn DetailFetcher> = Arc::new(StubDetails {
        calls: AtomicUsize::new(0),
    });
    let err = assembler(Arc::new(FailingCatalog), details, CancellationToken::new())
        .assemble(&Progress::silent())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CatalogError::BadStatus {
            section: Section::Reading,
            status: 503
        }
    ));
}

#[tokio::test]
async fn test_dataset_file_can_be_reloaded() {
    let details: Arc<dyn DetailFetcher> = Arc::new(StubDetails {
        calls: AtomicUsize::new(0),
    });
    let bank = assembler(Arc::new(StubCatalog), details, CancellationToken::new())
        .assemble(&Progress::silent())
        .await
        .unwrap();

    let path = std::env::temp_dir().join(format!("qbank-dataset-{}.json", std::process::id()));
    write_json(&path, &bank.questions).await.unwrap();
    let loaded: Dataset =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded.len(), bank.questions.len());
    assert_eq!(loaded["math-004"].basic_info.external_id.as_deref(), Some("ext-math-004"));
}

#[tokio::test]
#[ignore] // 默认忽略，需要网络：cargo test -- --ignored
async fn test_live_catalog_and_detail() {
    logging::init(true);

    let config = Config::from_env();
    let client = Arc::new(QbankClient::new(config.client_settings()).expect("创建客户端失败"));

    let catalog = client
        .fetch_catalog(Section::Math)
        .await
        .expect("获取目录失败");
    assert!(!catalog.is_empty());

    let dispatcher = FetchDispatcher::new(client.clone(), config.max_concurrent_requests);
    let tasks = qbank_module_builder::services::FetchTask::from_summaries(&catalog[..catalog.len().min(5)]);
    let outcome = dispatcher
        .dispatch(tasks, &Progress::silent(), ProgressRange::new(0, 100))
        .await;
    assert_eq!(outcome.details.len(), outcome.stats.total);
}
