//! 翻译服务集成测试
//!
//! 覆盖解析、合并、版本化保存、缓存读穿与失效

use std::collections::BTreeMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use locale_service::cache::{MemoryCacheBackend, TranslationCacheService};
use locale_service::error::LocaleError;
use locale_service::models::{
    LocaleTranslationCreate, LocaleTranslationUpdate, TranslationCreate, TranslationUpdate,
    UpsertRequest,
};
use locale_service::service::TranslationService;
use locale_service::settings::{CacheSettings, StoreSettings};
use locale_service::store::{TranslationFilter, TranslationStore};

mod common;

use common::{
    modules, CountingCacheBackend, FailingCacheBackend, FlakyTranslationStore, TestEnvironment,
};

fn overrides(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(m, t)| (m.to_string(), t.to_string()))
        .collect()
}

/// 按钮文案在账单模块中被覆盖
#[tokio::test]
async fn test_save_button_scenario() {
    let env = TestEnvironment::new();
    env.translations
        .upsert_translation_locale(
            "btn.save",
            "en",
            "Save",
            modules(&["core", "billing"]),
            None,
            Some(overrides(&[("billing", "Save Plan")])),
        )
        .await
        .unwrap();

    let service = &env.translations;
    assert_eq!(service.get_text("btn.save", "en", Some("billing")).await.unwrap(), "Save Plan");
    assert_eq!(service.get_text("btn.save", "en", Some("core")).await.unwrap(), "Save");
    assert_eq!(service.get_text("btn.save", "en", None).await.unwrap(), "Save");
    assert_eq!(service.get_text("btn.save", "fr", None).await.unwrap(), "btn.save");
}

#[tokio::test]
async fn test_unknown_key_is_not_found() {
    let env = TestEnvironment::new();
    let err = env.translations.get_text("missing", "en", None).await.unwrap_err();
    assert!(matches!(err, LocaleError::NotFound(_)));

    // 不做负缓存：之后创建的键立即可读
    env.translations
        .upsert(UpsertRequest::single("missing", modules(&["core"]), "en", "Found"))
        .await
        .unwrap();
    assert_eq!(env.translations.get_text("missing", "en", None).await.unwrap(), "Found");
}

#[tokio::test]
async fn test_create_requires_modules() {
    let env = TestEnvironment::new();
    let create = TranslationCreate {
        key: "k1".to_string(),
        modules: Vec::new(),
        description: None,
        translations: BTreeMap::new(),
    };
    let err = env.translations.create_translation(create).await.unwrap_err();
    assert!(matches!(err, LocaleError::InvalidInput(_)));

    let err = env
        .translations
        .upsert(UpsertRequest::single("k1", Vec::new(), "en", "Hello"))
        .await
        .unwrap_err();
    assert!(matches!(err, LocaleError::InvalidInput(_)));
    assert!(env.store.is_empty().await);
}

#[tokio::test]
async fn test_create_duplicate_key_conflicts() {
    let env = TestEnvironment::new();
    let mut translations = BTreeMap::new();
    translations.insert(
        "en".to_string(),
        LocaleTranslationCreate {
            text: "Hello".to_string(),
            module_overrides: BTreeMap::new(),
            description: None,
        },
    );
    let create = TranslationCreate {
        key: "greeting".to_string(),
        modules: modules(&["core"]),
        description: Some("Greeting".to_string()),
        translations,
    };

    let created = env.translations.create_translation(create.clone()).await.unwrap();
    assert!(created.id.is_some());
    assert_eq!(created.translations["en"].text, "Hello");

    let err = env.translations.create_translation(create).await.unwrap_err();
    assert!(matches!(err, LocaleError::Conflict(_)));
}

#[tokio::test]
async fn test_upsert_is_idempotent() {
    let env = TestEnvironment::new();
    let request = UpsertRequest::single("k1", modules(&["core"]), "en", "Hello");

    let first = env.translations.upsert(request.clone()).await.unwrap();
    let second = env.translations.upsert(request).await.unwrap();

    assert_eq!(second.translations.len(), 1);
    assert_eq!(second.translations["en"].text, "Hello");
    assert_eq!(second.modules, first.modules);
    assert!(second.updated_at >= first.updated_at);
    assert_eq!(second.version, first.version + 1);
}

#[tokio::test]
async fn test_upsert_preserves_other_locales_and_overrides() {
    let env = TestEnvironment::new();
    env.translations
        .upsert(
            UpsertRequest::single("k1", modules(&["core"]), "en", "Hello")
                .with_module_overrides(overrides(&[("billing", "Hello payer")])),
        )
        .await
        .unwrap();
    let with_fr = env
        .translations
        .upsert_translation_locale("k1", "fr", "Bonjour", modules(&["core"]), None, None)
        .await
        .unwrap();
    let fr_before = with_fr.translations["fr"].clone();

    let after = env
        .translations
        .upsert(
            UpsertRequest::single("k1", modules(&["core"]), "en", "Hi")
                .with_module_overrides(overrides(&[("admin", "Hi admin")])),
        )
        .await
        .unwrap();

    assert_eq!(after.translations["fr"], fr_before);
    let en = &after.translations["en"];
    assert_eq!(en.text, "Hi");
    assert_eq!(en.module_overrides["billing"], "Hello payer");
    assert_eq!(en.module_overrides["admin"], "Hi admin");
}

#[tokio::test]
async fn test_bulk_upsert_with_single_locale() {
    let env = TestEnvironment::new();
    let mut bulk = BTreeMap::new();
    bulk.insert(
        "de".to_string(),
        LocaleTranslationUpdate {
            text: Some("Hallo".to_string()),
            ..Default::default()
        },
    );
    let request = UpsertRequest {
        translations: Some(bulk),
        ..UpsertRequest::single("k1", modules(&["core"]), "en", "Hello")
    };

    let saved = env.translations.upsert(request).await.unwrap();
    let locales: Vec<&str> = saved.locales().collect();
    assert_eq!(locales, vec!["de", "en"]);
}

#[tokio::test]
async fn test_override_applies_to_undeclared_module() {
    let env = TestEnvironment::new();
    env.translations
        .upsert(
            UpsertRequest::single("k1", modules(&["core"]), "en", "Hello")
                .with_module_overrides(overrides(&[("admin", "Hello admin")])),
        )
        .await
        .unwrap();

    let stored = env.translations.get_translation("k1").await.unwrap();
    assert!(!stored.has_module("admin"));
    assert_eq!(
        env.translations.get_text("k1", "en", Some("admin")).await.unwrap(),
        "Hello admin"
    );
}

#[tokio::test]
async fn test_update_translation_by_id_and_key() {
    let env = TestEnvironment::new();
    let created = env
        .translations
        .upsert(UpsertRequest::single("k1", modules(&["core"]), "en", "Hello"))
        .await
        .unwrap();
    let id = created.id.unwrap().to_hex();

    let updated = env
        .translations
        .update_translation(
            &id,
            TranslationUpdate {
                modules: Some(modules(&["billing"])),
                description: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.modules, modules(&["billing"]));
    assert_eq!(updated.description.as_deref(), Some(""));

    let by_key = env.translations.get_translation("k1").await.unwrap();
    assert_eq!(by_key, updated);

    let err = env
        .translations
        .update_translation("missing", TranslationUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LocaleError::NotFound(_)));
}

#[tokio::test]
async fn test_upsert_module_override() {
    let env = TestEnvironment::new();
    env.translations
        .upsert(UpsertRequest::single("k1", modules(&["core"]), "en", "Hello"))
        .await
        .unwrap();

    let saved = env
        .translations
        .upsert_module_override("k1", "en", "shop", "Hello shopper")
        .await
        .unwrap();
    assert_eq!(saved.modules, modules(&["core", "shop"]));
    assert_eq!(saved.translations["en"].module_overrides.len(), 1);

    let err = env
        .translations
        .upsert_module_override("k1", "fr", "shop", "Salut")
        .await
        .unwrap_err();
    assert!(matches!(err, LocaleError::NotFound(_)));

    let err = env
        .translations
        .upsert_module_override("missing", "en", "shop", "Hi")
        .await
        .unwrap_err();
    assert!(matches!(err, LocaleError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_locale_keeps_record() {
    let env = TestEnvironment::new();
    env.translations
        .upsert(UpsertRequest::single("k1", modules(&["core"]), "en", "Hello"))
        .await
        .unwrap();

    assert!(env.translations.delete_locale_translation("k1", "en").await.unwrap());
    assert!(!env.translations.delete_locale_translation("k1", "en").await.unwrap());
    assert!(!env.translations.delete_locale_translation("missing", "en").await.unwrap());

    let stored = env.translations.get_translation("k1").await.unwrap();
    assert!(stored.translations.is_empty());
    assert_eq!(env.translations.get_text("k1", "en", None).await.unwrap(), "k1");
}

#[tokio::test]
async fn test_delete_translation() {
    let env = TestEnvironment::new();
    env.translations
        .upsert(UpsertRequest::single("k1", modules(&["core"]), "en", "Hello"))
        .await
        .unwrap();
    assert_eq!(env.translations.get_text("k1", "en", None).await.unwrap(), "Hello");

    assert!(env.translations.delete_translation("k1").await.unwrap());
    assert!(!env.translations.delete_translation("k1").await.unwrap());

    let err = env.translations.get_text("k1", "en", None).await.unwrap_err();
    assert!(matches!(err, LocaleError::NotFound(_)));
}

/// 记录中没有的语言会缓存键本身，删除后这些条目也必须失效
#[tokio::test]
async fn test_delete_translation_clears_key_fallback_in_every_locale() {
    let env = TestEnvironment::new();
    env.translations
        .upsert(UpsertRequest::single("k1", modules(&["core"]), "en", "Hello"))
        .await
        .unwrap();
    assert_eq!(env.translations.get_text("k1", "fr", None).await.unwrap(), "k1");
    assert_eq!(
        env.translations.get_text("k1", "de", Some("core")).await.unwrap(),
        "k1"
    );
    assert_eq!(env.cache.get_text("fr", "k1", None).await.as_deref(), Some("k1"));

    assert!(env.translations.delete_translation("k1").await.unwrap());

    assert_eq!(env.cache.get_text("fr", "k1", None).await, None);
    for (locale, module) in [("en", None), ("fr", None), ("de", Some("core"))] {
        let err = env
            .translations
            .get_text("k1", locale, module)
            .await
            .unwrap_err();
        assert!(matches!(err, LocaleError::NotFound(_)));
    }
}

#[tokio::test]
async fn test_register_translation() {
    let env = TestEnvironment::new();
    let service = &env.translations;

    let created = service
        .register_translation("nav.home", "en", "core", Some("nav.home"), None)
        .await
        .unwrap();
    assert!(created.translations.is_empty());

    let err = service
        .register_translation("nav.home", "en", "core", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LocaleError::Conflict(_)));

    let unioned = service
        .register_translation("nav.home", "en", "shop", None, None)
        .await
        .unwrap();
    assert_eq!(unioned.modules, modules(&["core", "shop"]));

    let with_text = service
        .register_translation("nav.cart", "en", "shop", Some("Cart"), Some("Cart link"))
        .await
        .unwrap();
    assert_eq!(with_text.translations["en"].text, "Cart");
    assert_eq!(with_text.description.as_deref(), Some("Cart link"));

    let err = service
        .register_translation("nav.cart", "en", " ", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LocaleError::InvalidInput(_)));
}

#[tokio::test]
async fn test_list_translations_filters() {
    let env = TestEnvironment::new();
    for (key, module, locale) in [("a", "core", "en"), ("b", "core", "fr"), ("c", "shop", "en")] {
        env.translations
            .upsert(UpsertRequest::single(key, modules(&[module]), locale, key))
            .await
            .unwrap();
    }

    let core = env
        .translations
        .list_translations(&TranslationFilter::for_module("core"), 0, None)
        .await
        .unwrap();
    assert_eq!(core.len(), 2);

    let english = TranslationFilter {
        module: None,
        locale: Some("en".to_string()),
    };
    let listed = env.translations.list_translations(&english, 1, Some(10)).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].key, "c");
}

#[tokio::test]
async fn test_read_through_cache_serves_cached_text() {
    let env = TestEnvironment::new();
    env.translations
        .upsert(UpsertRequest::single("k1", modules(&["core"]), "en", "Hello"))
        .await
        .unwrap();
    assert_eq!(env.translations.get_text("k1", "en", None).await.unwrap(), "Hello");

    // 绕过服务直接修改存储：缓存中的值仍然有效
    let mut stored = env.store.find_by_key("k1").await.unwrap().unwrap();
    stored.translations.get_mut("en").unwrap().text = "Changed".to_string();
    assert!(env.store.save(&stored, stored.version).await.unwrap());

    assert_eq!(env.translations.get_text("k1", "en", None).await.unwrap(), "Hello");
    assert!(env.cache.stats().hits >= 1);
}

#[tokio::test]
async fn test_writes_invalidate_cached_text() {
    let env = TestEnvironment::new();
    env.translations
        .upsert(UpsertRequest::single("k1", modules(&["core"]), "en", "Hello"))
        .await
        .unwrap();
    assert_eq!(env.translations.get_text("k1", "de", None).await.unwrap(), "k1");
    assert_eq!(env.translations.get_text("k1", "en", Some("core")).await.unwrap(), "Hello");

    env.translations
        .upsert_translation_locale("k1", "de", "Hallo", modules(&["core"]), None, None)
        .await
        .unwrap();
    env.translations
        .upsert_module_override("k1", "en", "core", "Hello core")
        .await
        .unwrap();

    assert_eq!(env.translations.get_text("k1", "de", None).await.unwrap(), "Hallo");
    assert_eq!(
        env.translations.get_text("k1", "en", Some("core")).await.unwrap(),
        "Hello core"
    );
}

#[tokio::test]
async fn test_translations_map_is_cached_and_invalidated() {
    let env = TestEnvironment::new();
    env.translations
        .upsert(
            UpsertRequest::single("btn.save", modules(&["core", "billing"]), "en", "Save")
                .with_module_overrides(overrides(&[("billing", "Save Plan")])),
        )
        .await
        .unwrap();
    env.translations
        .upsert(UpsertRequest::single("btn.pay", modules(&["billing"]), "en", "Pay"))
        .await
        .unwrap();

    let map = env
        .translations
        .get_translations_map("en", "billing", 0, None)
        .await
        .unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map["btn.save"], "Save Plan");

    let cached = env.cache.get_map("en", "billing").await.unwrap();
    assert_eq!(cached, map);

    env.translations
        .upsert(UpsertRequest::single("btn.pay", modules(&["billing"]), "en", "Pay now"))
        .await
        .unwrap();
    assert_eq!(env.cache.get_map("en", "billing").await, None);

    let map = env
        .translations
        .get_translations_map("en", "billing", 0, None)
        .await
        .unwrap();
    assert_eq!(map["btn.pay"], "Pay now");

    // 分页结果不写缓存
    let page = env
        .translations
        .get_translations_map("en", "core", 0, Some(1))
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(env.cache.get_map("en", "core").await, None);

    // 空结果不写缓存
    let empty = env
        .translations
        .get_translations_map("fr", "billing", 0, None)
        .await
        .unwrap();
    assert!(empty.is_empty());
    assert_eq!(env.cache.get_map("fr", "billing").await, None);
}

#[tokio::test]
async fn test_module_change_invalidates_old_module_map() {
    let env = TestEnvironment::new();
    env.translations
        .upsert(UpsertRequest::single("k1", modules(&["core"]), "en", "Hello"))
        .await
        .unwrap();
    let map = env.translations.get_translations_map("en", "core", 0, None).await.unwrap();
    assert_eq!(map.len(), 1);

    env.translations
        .update_translation(
            "k1",
            TranslationUpdate {
                modules: Some(modules(&["shop"])),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let map = env.translations.get_translations_map("en", "core", 0, None).await.unwrap();
    assert!(map.is_empty());
}

/// 每个受影响的语言只做一次整体失效，不再逐模块重复扫描
#[tokio::test]
async fn test_write_scans_once_per_touched_locale() {
    let backend = Arc::new(CountingCacheBackend::default());
    let cache = Arc::new(TranslationCacheService::new(
        backend.clone(),
        CacheSettings::default(),
    ));
    let service = TranslationService::new(
        Arc::new(locale_service::store::MemoryTranslationStore::new()),
        cache,
        StoreSettings::default(),
    );

    service
        .upsert(UpsertRequest::single(
            "k1",
            modules(&["core", "billing", "shop", "admin"]),
            "en",
            "Hello",
        ))
        .await
        .unwrap();
    assert_eq!(backend.scans.load(Ordering::SeqCst), 2);

    service
        .upsert_translation_locale(
            "k1",
            "en",
            "Hi",
            modules(&["core", "billing", "shop", "admin"]),
            None,
            None,
        )
        .await
        .unwrap();
    assert_eq!(backend.scans.load(Ordering::SeqCst), 4);

    assert!(service.delete_translation("k1").await.unwrap());
    assert_eq!(backend.scans.load(Ordering::SeqCst), 7);
}

/// 批量写法中带空白的语言代码与单语言写法落到同一语言
#[tokio::test]
async fn test_bulk_locale_codes_are_normalized() {
    let env = TestEnvironment::new();
    env.translations
        .upsert(UpsertRequest::single("k1", modules(&["core"]), "en", "Hello"))
        .await
        .unwrap();

    let mut bulk = BTreeMap::new();
    bulk.insert(
        " en ".to_string(),
        LocaleTranslationUpdate {
            text: Some("Hi".to_string()),
            ..Default::default()
        },
    );
    let updated = env
        .translations
        .upsert(UpsertRequest {
            key: "k1".to_string(),
            translations: Some(bulk),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(updated.translations.len(), 1);
    assert_eq!(env.translations.get_text("k1", "en", None).await.unwrap(), "Hi");
}

#[tokio::test]
async fn test_cache_failures_do_not_break_reads_or_writes() {
    let store = Arc::new(locale_service::store::MemoryTranslationStore::new());
    let backend = Arc::new(FailingCacheBackend::default());
    let cache = Arc::new(TranslationCacheService::new(
        backend.clone(),
        CacheSettings::default(),
    ));
    let service = TranslationService::new(store, cache.clone(), StoreSettings::default());

    service
        .upsert(UpsertRequest::single("k1", modules(&["core"]), "en", "Hello"))
        .await
        .unwrap();
    assert_eq!(service.get_text("k1", "en", None).await.unwrap(), "Hello");
    assert_eq!(
        service.get_translations_map("en", "core", 0, None).await.unwrap()["k1"],
        "Hello"
    );

    let stats = cache.stats();
    assert!(stats.errors > 0);
    assert_eq!(stats.hits, 0);
}

#[tokio::test]
async fn test_version_conflict_is_retried() {
    let store = Arc::new(FlakyTranslationStore::failing(0));
    let cache = Arc::new(TranslationCacheService::new(
        Arc::new(MemoryCacheBackend::new()),
        CacheSettings::default(),
    ));
    let service = TranslationService::new(store.clone(), cache, StoreSettings { max_retries: 3 });

    service
        .upsert(UpsertRequest::single("k1", modules(&["core"]), "en", "Hello"))
        .await
        .unwrap();

    store.save_failures.store(2, std::sync::atomic::Ordering::SeqCst);
    let saved = service
        .upsert(UpsertRequest::single("k1", modules(&["core"]), "fr", "Bonjour"))
        .await
        .unwrap();
    assert_eq!(saved.translations.len(), 2);

    store.save_failures.store(3, std::sync::atomic::Ordering::SeqCst);
    let err = service
        .upsert(UpsertRequest::single("k1", modules(&["core"]), "de", "Hallo"))
        .await
        .unwrap_err();
    assert!(matches!(err, LocaleError::Conflict(_)));

    let stored = service.get_translation("k1").await.unwrap();
    assert!(stored.locale("de").is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_upserts_keep_every_locale() {
    let locales = ["en", "fr", "de", "es", "it", "pl"];
    let env = TestEnvironment::with_settings(
        CacheSettings::default(),
        StoreSettings {
            max_retries: locales.len(),
        },
    );

    let mut handles = Vec::new();
    for locale in locales {
        let service = env.translations.clone();
        handles.push(tokio::spawn(async move {
            service
                .upsert_translation_locale(
                    "shared.key",
                    locale,
                    &format!("text-{}", locale),
                    modules(&["core"]),
                    None,
                    None,
                )
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = env.translations.get_translation("shared.key").await.unwrap();
    assert_eq!(stored.translations.len(), locales.len());
    for locale in locales {
        assert_eq!(
            env.translations.get_text("shared.key", locale, None).await.unwrap(),
            format!("text-{}", locale)
        );
    }
}
