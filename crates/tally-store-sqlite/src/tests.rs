//! Integration tests for `SqliteStore` against an in-memory database.

use tally_core::{
  Error as CoreError,
  rank::{NewRankTier, RankPatch},
  record::{BatchItem, MAX_ADJUSTMENT, RecordQuery, ScoreAdjustment, SkipReason},
  seed::RankSeed,
  store::ScoreStore,
  student::{NewStudent, Student, StudentPatch},
  template::{NewTemplate, TemplatePatch},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn student(s: &SqliteStore, no: &str, name: &str) -> Student {
  s.create_student(NewStudent::new(no, name)).await.unwrap()
}

fn core(err: Error) -> CoreError {
  match err {
    Error::Core(e) => e,
    other => panic!("expected a domain error, got {other:?}"),
  }
}

// ─── Seeding ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn fresh_store_is_seeded() {
  let s = store().await;
  let ranks = s.list_ranks().await.unwrap();
  assert_eq!(ranks.len(), 10);
  assert_eq!(ranks[0].name, "学徒");
  assert_eq!(ranks[0].min_score, 0);
  assert!(ranks.windows(2).all(|w| w[0].min_score < w[1].min_score));

  let templates = s.list_templates().await.unwrap();
  assert_eq!(templates.len(), 7);
}

#[tokio::test]
async fn seed_once_keeps_custom_tiers() {
  let s = store().await;
  s.create_rank(NewRankTier {
    name:       "Custom".into(),
    min_score:  5000,
    color:      "#123456".into(),
    icon:       String::new(),
    sort_order: None,
  })
  .await
  .unwrap();

  let report = s.seed(RankSeed::SeedOnce).await.unwrap();
  assert_eq!(report.tiers_installed, 0);
  assert_eq!(report.templates_installed, 0);

  let ranks = s.list_ranks().await.unwrap();
  assert_eq!(ranks.len(), 11);
  assert!(ranks.iter().any(|r| r.name == "Custom"));
}

#[tokio::test]
async fn reset_seed_replaces_tiers_but_not_templates() {
  let s = store().await;
  s.create_rank(NewRankTier {
    name:       "Custom".into(),
    min_score:  5000,
    color:      String::new(),
    icon:       String::new(),
    sort_order: None,
  })
  .await
  .unwrap();
  s.create_template(NewTemplate::new("Extra", 1, "misc")).await.unwrap();

  let report = s.seed(RankSeed::Reset).await.unwrap();
  assert_eq!(report.tiers_installed, 10);
  assert_eq!(report.templates_installed, 0);

  let ranks = s.list_ranks().await.unwrap();
  assert_eq!(ranks.len(), 10);
  assert!(ranks.iter().all(|r| r.name != "Custom"));
  assert_eq!(s.list_templates().await.unwrap().len(), 8);
}

// ─── Students ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_student() {
  let s = store().await;
  let created = student(&s, " 01 ", " 黄嘉乐 ").await;
  assert_eq!(created.student_no, "01");
  assert_eq!(created.name, "黄嘉乐");
  assert_eq!(created.score, 0);

  let fetched = s.get_student(created.id).await.unwrap().unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_student_missing_returns_none() {
  let s = store().await;
  assert!(s.get_student(999).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_student_no_is_rejected() {
  let s = store().await;
  student(&s, "01", "A").await;
  let err = s.create_student(NewStudent::new("01", "B")).await.unwrap_err();
  assert!(matches!(core(err), CoreError::DuplicateStudentNo(no) if no == "01"));
}

#[tokio::test]
async fn blank_student_fields_are_rejected() {
  let s = store().await;
  let err = s.create_student(NewStudent::new("  ", "A")).await.unwrap_err();
  assert!(matches!(core(err), CoreError::Invalid(_)));
}

#[tokio::test]
async fn batch_create_is_all_or_nothing() {
  let s = store().await;
  student(&s, "03", "Existing").await;

  let err = s
    .create_students(vec![NewStudent::new("01", "A"), NewStudent::new("03", "Clash")])
    .await
    .unwrap_err();
  assert!(matches!(core(err), CoreError::DuplicateStudentNo(_)));
  assert_eq!(s.list_students().await.unwrap().len(), 1);

  let created = s
    .create_students(vec![NewStudent::new("01", "A"), NewStudent::new("02", "B")])
    .await
    .unwrap();
  assert_eq!(created.len(), 2);
  assert_eq!(s.list_students().await.unwrap().len(), 3);
}

#[tokio::test]
async fn update_student_patches_fields() {
  let s = store().await;
  let a = student(&s, "01", "A").await;
  student(&s, "02", "B").await;

  let updated = s
    .update_student(a.id, StudentPatch { student_no: Some(" ".into()), name: Some("Alpha".into()) })
    .await
    .unwrap();
  assert_eq!(updated.student_no, "01");
  assert_eq!(updated.name, "Alpha");
  assert!(updated.updated_at >= a.updated_at);

  let err = s
    .update_student(a.id, StudentPatch { student_no: Some("02".into()), name: None })
    .await
    .unwrap_err();
  assert!(matches!(core(err), CoreError::DuplicateStudentNo(_)));

  let err = s.update_student(999, StudentPatch::default()).await.unwrap_err();
  assert!(matches!(core(err), CoreError::StudentNotFound(999)));
}

#[tokio::test]
async fn leaderboard_order_breaks_ties_by_student_no() {
  let s = store().await;
  let c = student(&s, "03", "C").await;
  let a = student(&s, "01", "A").await;
  let b = student(&s, "02", "B").await;
  s.adjust_score(c.id, ScoreAdjustment::new(10)).await.unwrap();
  s.adjust_score(a.id, ScoreAdjustment::new(10)).await.unwrap();
  s.adjust_score(b.id, ScoreAdjustment::new(25)).await.unwrap();

  let order: Vec<_> = s
    .list_students()
    .await
    .unwrap()
    .into_iter()
    .map(|st| st.student_no)
    .collect();
  assert_eq!(order, ["02", "01", "03"]);

  assert_eq!(s.count_students_above(10).await.unwrap(), 1);
  assert_eq!(s.count_students_above(25).await.unwrap(), 0);
}

#[tokio::test]
async fn search_matches_name_or_number() {
  let s = store().await;
  student(&s, "2024001", "黄嘉乐").await;
  student(&s, "2024002", "陈标炎").await;
  student(&s, "100%", "Percent").await;

  assert_eq!(s.search_students("黄").await.unwrap().len(), 1);
  assert_eq!(s.search_students("2024").await.unwrap().len(), 2);
  assert_eq!(s.search_students("0%").await.unwrap().len(), 1);
  assert!(s.search_students("nobody").await.unwrap().is_empty());

  let err = s.search_students("  ").await.unwrap_err();
  assert!(matches!(core(err), CoreError::Invalid(_)));
}

#[tokio::test]
async fn delete_student_cascades_records() {
  let s = store().await;
  let a = student(&s, "01", "A").await;
  let b = student(&s, "02", "B").await;
  s.adjust_score(a.id, ScoreAdjustment::new(3)).await.unwrap();
  s.adjust_score(a.id, ScoreAdjustment::new(-1)).await.unwrap();
  s.adjust_score(b.id, ScoreAdjustment::new(2)).await.unwrap();

  assert_eq!(s.delete_student(a.id).await.unwrap(), 2);
  assert!(s.get_student(a.id).await.unwrap().is_none());

  let page = s.list_records(RecordQuery::default()).await.unwrap();
  assert_eq!(page.total, 1);
  assert_eq!(page.data[0].student.id, b.id);

  let err = s.delete_student(a.id).await.unwrap_err();
  assert!(matches!(core(err), CoreError::StudentNotFound(_)));
}

// ─── Score records ───────────────────────────────────────────────────────────

#[tokio::test]
async fn adjust_then_undo_restores_score() {
  let s = store().await;
  let a = student(&s, "01", "A").await;

  let change = s
    .adjust_score(
      a.id,
      ScoreAdjustment::new(5).with_reason("回答问题").with_category("课堂表现"),
    )
    .await
    .unwrap();
  assert_eq!(change.new_score, 5);
  assert_eq!(change.record.value, 5);
  assert_eq!(change.record.reason, "回答问题");
  assert_eq!(change.record.category, "课堂表现");

  let undone = s.undo_record(change.record.id).await.unwrap();
  assert_eq!(undone.new_score, 0);
  assert_eq!(undone.record, change.record);
  assert_eq!(s.get_student(a.id).await.unwrap().unwrap().score, 0);

  let err = s.undo_record(change.record.id).await.unwrap_err();
  assert!(matches!(core(err), CoreError::RecordNotFound(_)));
  assert_eq!(s.get_student(a.id).await.unwrap().unwrap().score, 0);
}

#[tokio::test]
async fn score_equals_sum_of_records() {
  let s = store().await;
  let a = student(&s, "01", "A").await;
  for v in [3, -1, 7, -2, 4] {
    s.adjust_score(a.id, ScoreAdjustment::new(v)).await.unwrap();
  }
  let records = s.recent_records(a.id, 50).await.unwrap();
  let sum: i64 = records.iter().map(|r| r.value).sum();
  assert_eq!(s.get_student(a.id).await.unwrap().unwrap().score, sum);
  assert_eq!(sum, 11);
}

#[tokio::test]
async fn scores_may_go_negative() {
  let s = store().await;
  let a = student(&s, "01", "A").await;
  let change = s.adjust_score(a.id, ScoreAdjustment::new(-2)).await.unwrap();
  assert_eq!(change.new_score, -2);
}

#[tokio::test]
async fn zero_delta_is_rejected() {
  let s = store().await;
  let a = student(&s, "01", "A").await;
  let err = s.adjust_score(a.id, ScoreAdjustment::new(0)).await.unwrap_err();
  assert!(matches!(core(err), CoreError::Invalid(_)));
  assert!(s.recent_records(a.id, 50).await.unwrap().is_empty());
}

#[tokio::test]
async fn oversized_delta_is_rejected() {
  let s = store().await;
  let a = student(&s, "01", "A").await;
  for value in [i64::MIN, i64::MAX, MAX_ADJUSTMENT + 1] {
    let err = s.adjust_score(a.id, ScoreAdjustment::new(value)).await.unwrap_err();
    assert!(matches!(core(err), CoreError::Invalid(_)));
  }
  assert!(s.recent_records(a.id, 50).await.unwrap().is_empty());
}

/// Write a score directly, bypassing the record log.
async fn force_score(s: &SqliteStore, id: i64, score: i64) {
  s.conn
    .call(move |conn| {
      conn.execute("UPDATE students SET score = ?1 WHERE id = ?2", rusqlite::params![
        score, id
      ])?;
      Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn overflowing_score_is_rejected_and_rolled_back() {
  let s = store().await;
  let a = student(&s, "01", "A").await;
  let b = student(&s, "02", "B").await;
  force_score(&s, a.id, i64::MAX - 1).await;

  let err = s.adjust_score(a.id, ScoreAdjustment::new(5)).await.unwrap_err();
  assert!(matches!(core(err), CoreError::Invalid(_)));
  assert_eq!(s.get_student(a.id).await.unwrap().unwrap().score, i64::MAX - 1);

  // One overflowing item fails the whole batch.
  let err = s
    .batch_adjust(vec![b.id, a.id], ScoreAdjustment::new(5))
    .await
    .unwrap_err();
  assert!(matches!(core(err), CoreError::Invalid(_)));
  assert_eq!(s.get_student(b.id).await.unwrap().unwrap().score, 0);
  assert_eq!(s.statistics().await.unwrap().total_records, 0);

  force_score(&s, a.id, i64::MIN + 1).await;
  let err = s.adjust_score(a.id, ScoreAdjustment::new(-5)).await.unwrap_err();
  assert!(matches!(core(err), CoreError::Invalid(_)));
}

#[tokio::test]
async fn undo_that_would_overflow_is_rejected() {
  let s = store().await;
  let a = student(&s, "01", "A").await;
  let change = s.adjust_score(a.id, ScoreAdjustment::new(-5)).await.unwrap();
  force_score(&s, a.id, i64::MAX - 1).await;

  let err = s.undo_record(change.record.id).await.unwrap_err();
  assert!(matches!(core(err), CoreError::Invalid(_)));
  assert_eq!(s.recent_records(a.id, 50).await.unwrap().len(), 1);
}

#[tokio::test]
async fn adjust_unknown_student_writes_nothing() {
  let s = store().await;
  let err = s.adjust_score(42, ScoreAdjustment::new(1)).await.unwrap_err();
  assert!(matches!(core(err), CoreError::StudentNotFound(42)));
  assert_eq!(s.statistics().await.unwrap().total_records, 0);
}

#[tokio::test]
async fn batch_adjust_skips_unknown_students() {
  let s = store().await;
  let a = student(&s, "01", "A").await;
  let b = student(&s, "02", "B").await;

  let items = s
    .batch_adjust(vec![a.id, 999, b.id], ScoreAdjustment::new(2).with_category("作业"))
    .await
    .unwrap();
  assert_eq!(items.len(), 3);
  assert!(items[0].is_applied());
  assert!(matches!(
    items[1],
    BatchItem::Skipped { student_id: 999, reason: SkipReason::StudentNotFound }
  ));
  assert!(matches!(items[2], BatchItem::Applied { new_score: 2, .. }));

  assert_eq!(s.get_student(a.id).await.unwrap().unwrap().score, 2);
  assert_eq!(s.get_student(b.id).await.unwrap().unwrap().score, 2);
  assert_eq!(s.statistics().await.unwrap().total_records, 2);
}

#[tokio::test]
async fn batch_adjust_rejects_empty_batch() {
  let s = store().await;
  let err = s.batch_adjust(vec![], ScoreAdjustment::new(1)).await.unwrap_err();
  assert!(matches!(core(err), CoreError::Invalid(_)));
}

#[tokio::test]
async fn recent_records_are_newest_first_and_limited() {
  let s = store().await;
  let a = student(&s, "01", "A").await;
  for v in 1..=5 {
    s.adjust_score(a.id, ScoreAdjustment::new(v)).await.unwrap();
  }
  let records = s.recent_records(a.id, 3).await.unwrap();
  let values: Vec<_> = records.iter().map(|r| r.value).collect();
  assert_eq!(values, [5, 4, 3]);
}

#[tokio::test]
async fn list_records_filters_and_pages() {
  let s = store().await;
  let a = student(&s, "01", "A").await;
  let b = student(&s, "02", "B").await;
  for v in 1..=5 {
    s.adjust_score(a.id, ScoreAdjustment::new(v).with_category("作业"))
      .await
      .unwrap();
  }
  s.adjust_score(b.id, ScoreAdjustment::new(-1).with_category("纪律"))
    .await
    .unwrap();

  let page = s
    .list_records(RecordQuery { page: 2, page_size: 2, ..Default::default() })
    .await
    .unwrap();
  assert_eq!(page.total, 6);
  assert_eq!(page.page, 2);
  assert_eq!(page.data.len(), 2);
  let values: Vec<_> = page.data.iter().map(|e| e.record.value).collect();
  assert_eq!(values, [4, 3]);

  let page = s
    .list_records(RecordQuery { student_id: Some(b.id), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(page.total, 1);
  assert_eq!(page.data[0].student.name, "B");

  let page = s
    .list_records(RecordQuery { category: Some("作业".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(page.total, 5);

  let page = s
    .list_records(RecordQuery { page: 10, ..Default::default() })
    .await
    .unwrap();
  assert_eq!(page.total, 6);
  assert!(page.data.is_empty());
}

#[tokio::test]
async fn reset_clears_scores_and_records() {
  let s = store().await;
  let a = student(&s, "01", "A").await;
  let b = student(&s, "02", "B").await;
  s.adjust_score(a.id, ScoreAdjustment::new(4)).await.unwrap();
  s.adjust_score(b.id, ScoreAdjustment::new(-3)).await.unwrap();

  let summary = s.reset_scores().await.unwrap();
  assert_eq!(summary.students_reset, 2);
  assert_eq!(summary.records_deleted, 2);

  assert!(s.list_students().await.unwrap().iter().all(|st| st.score == 0));
  assert_eq!(s.list_records(RecordQuery::default()).await.unwrap().total, 0);
  // Tiers and templates survive a reset.
  assert_eq!(s.list_ranks().await.unwrap().len(), 10);
  assert_eq!(s.list_templates().await.unwrap().len(), 7);
}

#[tokio::test]
async fn statistics_group_by_category() {
  let s = store().await;
  let a = student(&s, "01", "A").await;
  student(&s, "02", "B").await;
  s.adjust_score(a.id, ScoreAdjustment::new(3).with_category("作业")).await.unwrap();
  s.adjust_score(a.id, ScoreAdjustment::new(-2).with_category("作业")).await.unwrap();
  s.adjust_score(a.id, ScoreAdjustment::new(-1).with_category("纪律")).await.unwrap();

  let stats = s.statistics().await.unwrap();
  assert_eq!(stats.total_students, 2);
  assert_eq!(stats.total_records, 3);
  assert_eq!(stats.category_stats.len(), 2);

  let homework = stats.category_stats.iter().find(|c| c.category == "作业").unwrap();
  assert_eq!(homework.count, 2);
  assert_eq!(homework.total, 1);
  let discipline = stats.category_stats.iter().find(|c| c.category == "纪律").unwrap();
  assert_eq!(discipline.count, 1);
  assert_eq!(discipline.total, -1);
}

// ─── Templates ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn template_crud() {
  let s = store().await;
  let t = s.create_template(NewTemplate::new(" 值日 ", 1, "劳动")).await.unwrap();
  assert_eq!(t.name, "值日");

  let t = s
    .update_template(t.id, TemplatePatch { value: Some(2), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(t.value, 2);
  assert_eq!(t.name, "值日");

  s.delete_template(t.id).await.unwrap();
  let err = s.delete_template(t.id).await.unwrap_err();
  assert!(matches!(core(err), CoreError::TemplateNotFound(_)));

  let err = s.update_template(t.id, TemplatePatch::default()).await.unwrap_err();
  assert!(matches!(core(err), CoreError::TemplateNotFound(_)));
}

// ─── Rank tiers ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_threshold_is_rejected() {
  let s = store().await;
  let err = s
    .create_rank(NewRankTier {
      name:       "Again".into(),
      min_score:  20,
      color:      String::new(),
      icon:       String::new(),
      sort_order: None,
    })
    .await
    .unwrap_err();
  assert!(matches!(core(err), CoreError::DuplicateThreshold(20)));

  let ranks = s.list_ranks().await.unwrap();
  let bronze = ranks.iter().find(|r| r.min_score == 20).unwrap();
  let err = s
    .update_rank(bronze.id, RankPatch { min_score: Some(50), ..Default::default() })
    .await
    .unwrap_err();
  assert!(matches!(core(err), CoreError::DuplicateThreshold(50)));
}

#[tokio::test]
async fn new_rank_appends_sort_order() {
  let s = store().await;
  let tier = s
    .create_rank(NewRankTier {
      name:       "Mythic".into(),
      min_score:  2000,
      color:      String::new(),
      icon:       String::new(),
      sort_order: None,
    })
    .await
    .unwrap();
  assert_eq!(tier.sort_order, 11);
  assert_eq!(s.list_ranks().await.unwrap().last().unwrap().id, tier.id);
}

#[tokio::test]
async fn update_and_delete_rank() {
  let s = store().await;
  let ranks = s.list_ranks().await.unwrap();
  let top = ranks.last().unwrap().clone();

  let updated = s
    .update_rank(top.id, RankPatch { name: Some("Legend".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(updated.name, "Legend");
  assert_eq!(updated.min_score, top.min_score);

  let err = s
    .update_rank(top.id, RankPatch { min_score: Some(-1), ..Default::default() })
    .await
    .unwrap_err();
  assert!(matches!(core(err), CoreError::Invalid(_)));

  s.delete_rank(top.id).await.unwrap();
  assert_eq!(s.list_ranks().await.unwrap().len(), 9);
  let err = s.delete_rank(top.id).await.unwrap_err();
  assert!(matches!(core(err), CoreError::RankNotFound(_)));
}
