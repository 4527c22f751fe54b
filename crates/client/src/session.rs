//! Session-scoped controller behind the catalog view.
//!
//! Lifecycle: `mount` fetches filter options and the first page, every fetch
//! reseeds the remark tracker, toggles mutate it, and `commit` sends the
//! flagged entries before refetching the current page.

use review_common::{
    CatalogFilter, CatalogPage, CatalogProduct, FilterOptions, PaginationMeta, RemarkTag,
    DEFAULT_PAGE,
};
use tracing::{error, info, warn};

use crate::api::CatalogApi;
use crate::error::ClientError;
use crate::pagination::{page_window, PageLink};
use crate::tracker::{PendingEdit, RemarkTracker};

pub const LOAD_ERROR_MESSAGE: &str = "Failed to load products. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub saved: usize,
    pub server_message: String,
    /// `false` when the save went through but the follow-up fetch failed.
    pub refreshed: bool,
}

impl CommitOutcome {
    pub fn message(&self) -> String {
        format!("Successfully saved {} product(s)!", self.saved)
    }
}

pub struct ReviewSession<A: CatalogApi> {
    api: A,
    page_size: u64,
    filter: CatalogFilter,
    page: u64,
    products: Vec<CatalogProduct>,
    pagination: Option<PaginationMeta>,
    filter_options: FilterOptions,
    tracker: RemarkTracker,
    state: ViewState,
}

impl<A: CatalogApi> ReviewSession<A> {
    pub fn new(api: A, page_size: u64) -> Self {
        Self {
            api,
            page_size: page_size.max(1),
            filter: CatalogFilter::default(),
            page: DEFAULT_PAGE,
            products: Vec::new(),
            pagination: None,
            filter_options: FilterOptions::default(),
            tracker: RemarkTracker::new(),
            state: ViewState::Loading,
        }
    }

    /// Starts the session on a given filter and page instead of the defaults.
    pub fn starting_at(mut self, filter: CatalogFilter, page: u64) -> Self {
        self.filter = filter;
        self.page = page.max(1);
        self
    }

    /// Loads filter options and the current page concurrently. A failure to
    /// load filter options is logged and leaves the options empty.
    pub async fn mount(&mut self) -> Result<(), ClientError> {
        self.state = ViewState::Loading;
        let (options, page) = futures::join!(
            self.api.fetch_filters(),
            self.api.fetch_products(&self.filter, self.page, self.page_size)
        );

        match options {
            Ok(options) => self.filter_options = options,
            Err(e) => warn!(error = %e, "Failed to fetch filter options."),
        }
        self.apply_page(page)
    }

    /// Refetches the current page; any unsaved edits are dropped.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        self.state = ViewState::Loading;
        let page = self
            .api
            .fetch_products(&self.filter, self.page, self.page_size)
            .await;
        self.apply_page(page)
    }

    fn apply_page(&mut self, page: Result<CatalogPage, ClientError>) -> Result<(), ClientError> {
        match page {
            Ok(page) => {
                self.tracker.seed(&page.products);
                self.products = page.products;
                self.pagination = Some(page.pagination);
                self.state = ViewState::Ready;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, page = self.page, "Failed to fetch products.");
                self.state = ViewState::Failed(LOAD_ERROR_MESSAGE.to_string());
                Err(e)
            }
        }
    }

    pub async fn set_gender(&mut self, gender: Option<String>) -> Result<(), ClientError> {
        self.filter.gender = gender.filter(|g| !g.is_empty());
        self.on_filter_changed().await
    }

    pub async fn set_category(&mut self, category_id: Option<i32>) -> Result<(), ClientError> {
        self.filter.category_id = category_id;
        self.on_filter_changed().await
    }

    pub async fn set_brand(&mut self, brand_id: Option<i32>) -> Result<(), ClientError> {
        self.filter.brand_id = brand_id;
        self.on_filter_changed().await
    }

    /// Replaces all filters at once.
    pub async fn apply_filter(&mut self, filter: CatalogFilter) -> Result<(), ClientError> {
        self.filter = filter;
        self.on_filter_changed().await
    }

    pub async fn clear_filters(&mut self) -> Result<(), ClientError> {
        self.apply_filter(CatalogFilter::default()).await
    }

    async fn on_filter_changed(&mut self) -> Result<(), ClientError> {
        self.page = DEFAULT_PAGE;
        self.refresh().await
    }

    pub async fn go_to_page(&mut self, page: u64) -> Result<(), ClientError> {
        self.page = page.max(1);
        self.refresh().await
    }

    /// Edits are limited to the products currently displayed.
    pub fn toggle_remark(
        &mut self,
        product_id: i64,
        tag: RemarkTag,
        checked: bool,
    ) -> Result<&PendingEdit, ClientError> {
        self.tracker
            .toggle(product_id, tag, checked)
            .ok_or(ClientError::NotDisplayed(product_id))
    }

    pub fn flip_remark(&mut self, product_id: i64, tag: RemarkTag) -> Result<&PendingEdit, ClientError> {
        self.tracker
            .flip(product_id, tag)
            .ok_or(ClientError::NotDisplayed(product_id))
    }

    /// Sends every flagged pending edit in one batch, then refetches.
    ///
    /// An empty selection is refused without contacting the server. If the
    /// save fails the pending edits are left untouched for a retry.
    pub async fn commit(&mut self) -> Result<CommitOutcome, ClientError> {
        let selection = self.tracker.commit_selection();
        if selection.is_empty() {
            return Err(ClientError::NothingToCommit);
        }
        let saved = selection.len();

        let response = match self.api.save_remarks(selection).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Failed to save remarks.");
                return Err(e);
            }
        };
        info!(saved, message = %response.message, "Remarks saved.");
        self.tracker.mark_saved();

        let refreshed = self.refresh().await.is_ok();
        Ok(CommitOutcome {
            saved,
            server_message: response.message,
            refreshed,
        })
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn products(&self) -> &[CatalogProduct] {
        &self.products
    }

    pub fn pending(&self, product_id: i64) -> PendingEdit {
        self.tracker.get(product_id)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.tracker.has_unsaved_changes()
    }

    pub fn filter(&self) -> &CatalogFilter {
        &self.filter
    }

    pub fn filter_options(&self) -> &FilterOptions {
        &self.filter_options
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn total_pages(&self) -> u64 {
        self.pagination.map(|p| p.total_pages).unwrap_or(1)
    }

    pub fn pagination(&self) -> Option<&PaginationMeta> {
        self.pagination.as_ref()
    }

    pub fn page_links(&self) -> Vec<PageLink> {
        page_window(self.page, self.total_pages())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use review_common::{RemarkEdit, RemarkSet, SaveRemarksResponse};
    use reqwest::StatusCode;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Store {
        products: Vec<CatalogProduct>,
        product_fetches: usize,
        filter_fetches: usize,
        saves: Vec<Vec<RemarkEdit>>,
        last_request: Option<(CatalogFilter, u64)>,
        fail_save: bool,
        fail_fetch: bool,
    }

    /// In-memory backend with the server's catalog semantics.
    #[derive(Default)]
    struct FakeApi {
        store: Mutex<Store>,
    }

    impl FakeApi {
        fn with_products(count: i64, gender: &str) -> Self {
            let api = FakeApi::default();
            api.store.lock().unwrap().products = (1..=count)
                .map(|n| CatalogProduct {
                    id: n as i32,
                    product_id: 100 + n,
                    name: format!("Product {n}"),
                    is_flagged: false,
                    remarks: None,
                    category_name: "Dresses".to_string(),
                    gender: gender.to_string(),
                    brand_name: "Acme".to_string(),
                    thumbnail_path: None,
                    thumbnail_url: None,
                })
                .collect();
            api
        }
    }

    #[async_trait]
    impl CatalogApi for FakeApi {
        async fn fetch_products(
            &self,
            filter: &CatalogFilter,
            page: u64,
            limit: u64,
        ) -> Result<CatalogPage, ClientError> {
            let mut store = self.store.lock().unwrap();
            store.product_fetches += 1;
            store.last_request = Some((filter.clone(), page));
            if store.fail_fetch {
                return Err(ClientError::Api {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Internal server error".to_string(),
                });
            }
            let matching: Vec<CatalogProduct> = store
                .products
                .iter()
                .filter(|p| !p.is_flagged)
                .filter(|p| filter.gender.as_ref().map_or(true, |g| &p.gender == g))
                .cloned()
                .collect();
            let pagination = PaginationMeta::new(page, limit, matching.len() as u64);
            let products = match pagination.offset() {
                Some(offset) => matching
                    .into_iter()
                    .skip(offset as usize)
                    .take(limit as usize)
                    .collect(),
                None => Vec::new(),
            };
            Ok(CatalogPage {
                products,
                pagination,
            })
        }

        async fn fetch_filters(&self) -> Result<FilterOptions, ClientError> {
            let mut store = self.store.lock().unwrap();
            store.filter_fetches += 1;
            Ok(FilterOptions {
                categories: Vec::new(),
                brands: Vec::new(),
                genders: vec!["men".to_string(), "women".to_string()],
            })
        }

        async fn save_remarks(
            &self,
            edits: Vec<RemarkEdit>,
        ) -> Result<SaveRemarksResponse, ClientError> {
            let mut store = self.store.lock().unwrap();
            if store.fail_save {
                return Err(ClientError::Api {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Internal server error".to_string(),
                });
            }
            for edit in &edits {
                if let Some(product) = store
                    .products
                    .iter_mut()
                    .find(|p| p.product_id == edit.product_id)
                {
                    let (remarks, _) = RemarkSet::from_raw(&edit.remarks);
                    product.is_flagged = edit.is_flagged;
                    product.remarks = remarks.to_storage();
                }
            }
            let message = format!("Updated {} product(s)", edits.len());
            store.saves.push(edits);
            Ok(SaveRemarksResponse {
                success: true,
                message,
            })
        }
    }

    #[tokio::test]
    async fn test_mount_loads_options_and_first_page() {
        let mut session = ReviewSession::new(FakeApi::with_products(120, "women"), 50);
        session.mount().await.unwrap();

        assert_eq!(session.state(), &ViewState::Ready);
        assert_eq!(session.products().len(), 50);
        assert_eq!(session.total_pages(), 3);
        assert_eq!(session.filter_options().genders.len(), 2);
        assert!(!session.has_unsaved_changes());
    }

    #[tokio::test]
    async fn test_last_page_holds_the_remainder() {
        let mut session = ReviewSession::new(FakeApi::with_products(120, "women"), 50);
        session.set_gender(Some("women".to_string())).await.unwrap();
        session.go_to_page(3).await.unwrap();

        assert_eq!(session.products().len(), 20);
        let pagination = session.pagination().unwrap();
        assert!(!pagination.has_next);
        assert!(pagination.has_prev);
    }

    #[tokio::test]
    async fn test_empty_commit_makes_no_network_call() {
        let mut session = ReviewSession::new(FakeApi::with_products(3, "women"), 50);
        session.mount().await.unwrap();
        session.toggle_remark(101, RemarkTag::PoseIssue, true).unwrap();
        session.toggle_remark(101, RemarkTag::PoseIssue, false).unwrap();

        let result = session.commit().await;

        assert!(matches!(result, Err(ClientError::NothingToCommit)));
        let store = session.api.store.lock().unwrap();
        assert!(store.saves.is_empty());
        assert_eq!(store.product_fetches, 1);
    }

    #[tokio::test]
    async fn test_commit_sends_flagged_and_refetch_excludes_them() {
        let mut session = ReviewSession::new(FakeApi::with_products(3, "women"), 50);
        session.mount().await.unwrap();
        session.toggle_remark(101, RemarkTag::Nsfw, true).unwrap();
        session.toggle_remark(101, RemarkTag::QualityIssue, true).unwrap();
        session.toggle_remark(102, RemarkTag::PoseIssue, true).unwrap();
        session.toggle_remark(102, RemarkTag::PoseIssue, false).unwrap();

        let outcome = session.commit().await.unwrap();

        assert_eq!(outcome.saved, 1);
        assert!(outcome.refreshed);
        assert_eq!(outcome.message(), "Successfully saved 1 product(s)!");
        assert!(!session.has_unsaved_changes());
        assert!(session.products().iter().all(|p| p.product_id != 101));
        assert_eq!(session.products().len(), 2);

        let store = session.api.store.lock().unwrap();
        assert_eq!(
            store.saves,
            vec![vec![RemarkEdit {
                product_id: 101,
                is_flagged: true,
                remarks: vec!["nsfw".to_string(), "quality_issue".to_string()],
            }]]
        );
        let flagged = store.products.iter().find(|p| p.product_id == 101).unwrap();
        assert_eq!(flagged.remarks.as_deref(), Some("nsfw,quality_issue"));
    }

    #[tokio::test]
    async fn test_failed_commit_keeps_pending_edits() {
        let mut session = ReviewSession::new(FakeApi::with_products(3, "women"), 50);
        session.mount().await.unwrap();
        session.toggle_remark(103, RemarkTag::HandsVisibility, true).unwrap();
        session.api.store.lock().unwrap().fail_save = true;

        assert!(session.commit().await.is_err());
        assert!(session.has_unsaved_changes());
        assert!(session.pending(103).is_flagged());

        session.api.store.lock().unwrap().fail_save = false;
        let outcome = session.commit().await.unwrap();
        assert_eq!(outcome.saved, 1);
    }

    #[tokio::test]
    async fn test_filter_change_resets_page_and_discards_edits() {
        let mut session = ReviewSession::new(FakeApi::with_products(120, "women"), 50);
        session.mount().await.unwrap();
        session.go_to_page(2).await.unwrap();
        session.toggle_remark(160, RemarkTag::Nsfw, true).unwrap();
        assert!(session.has_unsaved_changes());

        session.set_gender(Some("women".to_string())).await.unwrap();

        assert_eq!(session.page(), 1);
        assert!(!session.has_unsaved_changes());
        assert!(!session.pending(160).is_flagged());
    }

    #[tokio::test]
    async fn test_each_filter_setter_refetches_from_page_one() {
        let mut session = ReviewSession::new(FakeApi::with_products(120, "women"), 50);
        session.mount().await.unwrap();

        session.go_to_page(2).await.unwrap();
        session.set_category(Some(3)).await.unwrap();
        assert_eq!(session.page(), 1);

        session.go_to_page(2).await.unwrap();
        session.set_brand(Some(9)).await.unwrap();
        assert_eq!(session.page(), 1);

        let expected = CatalogFilter {
            category_id: Some(3),
            brand_id: Some(9),
            gender: None,
        };
        assert_eq!(session.filter(), &expected);
        let store = session.api.store.lock().unwrap();
        assert_eq!(store.last_request, Some((expected, 1)));
    }

    #[tokio::test]
    async fn test_clear_filters_resets_everything_and_discards_edits() {
        let mut session = ReviewSession::new(FakeApi::with_products(120, "women"), 50);
        session.mount().await.unwrap();
        session.set_gender(Some("women".to_string())).await.unwrap();
        session.set_category(Some(3)).await.unwrap();
        session.set_brand(Some(9)).await.unwrap();
        session.go_to_page(2).await.unwrap();
        session.toggle_remark(170, RemarkTag::QualityIssue, true).unwrap();
        assert!(session.has_unsaved_changes());

        session.clear_filters().await.unwrap();

        assert!(session.filter().is_empty());
        assert_eq!(session.page(), 1);
        assert!(!session.has_unsaved_changes());
        assert!(!session.pending(170).is_flagged());
        let store = session.api.store.lock().unwrap();
        assert_eq!(store.last_request, Some((CatalogFilter::default(), 1)));
    }

    #[tokio::test]
    async fn test_apply_filter_replaces_all_filters() {
        let mut session = ReviewSession::new(FakeApi::with_products(3, "women"), 50)
            .starting_at(
                CatalogFilter {
                    category_id: Some(1),
                    brand_id: None,
                    gender: None,
                },
                2,
            );
        session.mount().await.unwrap();

        let replacement = CatalogFilter {
            category_id: None,
            brand_id: Some(4),
            gender: Some("men".to_string()),
        };
        session.apply_filter(replacement.clone()).await.unwrap();

        assert_eq!(session.filter(), &replacement);
        assert_eq!(session.page(), 1);
        assert!(session.products().is_empty());
    }

    #[tokio::test]
    async fn test_edits_outside_the_displayed_page_are_refused() {
        let mut session = ReviewSession::new(FakeApi::with_products(120, "women"), 50);
        session.mount().await.unwrap();

        let result = session.toggle_remark(175, RemarkTag::Nsfw, true);
        assert!(matches!(result, Err(ClientError::NotDisplayed(175))));
        assert!(matches!(
            session.flip_remark(175, RemarkTag::Nsfw),
            Err(ClientError::NotDisplayed(175))
        ));

        assert!(matches!(session.commit().await, Err(ClientError::NothingToCommit)));
        assert!(session.api.store.lock().unwrap().saves.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_sets_error_state() {
        let api = FakeApi::with_products(3, "women");
        api.store.lock().unwrap().fail_fetch = true;
        let mut session = ReviewSession::new(api, 50);

        assert!(session.mount().await.is_err());
        assert_eq!(
            session.state(),
            &ViewState::Failed(LOAD_ERROR_MESSAGE.to_string())
        );
    }
}
