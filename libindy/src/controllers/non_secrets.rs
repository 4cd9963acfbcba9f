use std::sync::Arc;

use indy_api_types::{
    domain::wallet::Tags, errors::prelude::*, SearchHandle, WalletHandle, INVALID_SEARCH_HANDLE,
};
use indy_utils::wql::Query;
use indy_wallet::{RecordOptions, SearchOptions, SearchScope, WalletRecord, WalletService};

use crate::domain::non_secrets::SearchRecords;

pub struct NonSecretsController {
    wallet_service: Arc<WalletService>,
}

impl NonSecretsController {
    pub(crate) fn new(wallet_service: Arc<WalletService>) -> NonSecretsController {
        NonSecretsController { wallet_service }
    }

    /// Create a new non-secret record in the wallet
    ///
    /// #Params
    /// wallet_handle: wallet handle (created by open_wallet)
    /// type_: allows to separate different record types collections
    /// id: the id of record
    /// value: the value of record
    /// tags: the record tags used for search and storing meta information as json:
    ///   {
    ///     "tagName1": <str>, // string tag (will be stored encrypted)
    ///     "tagName2": <str>, // string tag (will be stored encrypted)
    ///     "~tagName3": <str>, // string tag (will be stored un-encrypted)
    ///     "~tagName4": <str>, // string tag (will be stored un-encrypted)
    ///   }
    ///   Note that null means no tags
    ///   If tag name starts with "~" the tag will be stored un-encrypted that will allow
    ///   usage of this tag in complex search queries (comparison, predicates)
    ///   Encrypted tags can be searched only for exact matching
    pub async fn add_record(
        &self,
        wallet_handle: WalletHandle,
        type_: String,
        id: String,
        value: String,
        tags: Option<Tags>,
    ) -> IndyResult<()> {
        debug!(
            "add_record > wallet_handle {:?} type_ {:?} id {:?} value {:?} tags {:?}",
            wallet_handle,
            type_,
            id,
            secret!(&value),
            secret!(&tags)
        );

        self._check_type(&type_)?;
        self._check_id(&id)?;

        self.wallet_service
            .add_record(
                wallet_handle,
                &type_,
                &id,
                &value,
                &tags.unwrap_or_default(),
            )
            .await?;

        debug!("add_record < ()");
        Ok(())
    }

    /// Update a non-secret wallet record value
    pub async fn update_record_value(
        &self,
        wallet_handle: WalletHandle,
        type_: String,
        id: String,
        value: String,
    ) -> IndyResult<()> {
        debug!(
            "update_record_value > wallet_handle {:?} type_ {:?} id {:?} value {:?}",
            wallet_handle,
            type_,
            id,
            secret!(&value)
        );

        self._check_type(&type_)?;
        self._check_id(&id)?;

        self.wallet_service
            .update_record_value(wallet_handle, &type_, &id, &value)
            .await?;

        debug!("update_record_value < ()");
        Ok(())
    }

    /// Update a non-secret wallet record tags. All existing tags are replaced.
    pub async fn update_record_tags(
        &self,
        wallet_handle: WalletHandle,
        type_: String,
        id: String,
        tags: Tags,
    ) -> IndyResult<()> {
        debug!(
            "update_record_tags > wallet_handle {:?} type_ {:?} id {:?} tags {:?}",
            wallet_handle,
            type_,
            id,
            secret!(&tags)
        );

        self._check_type(&type_)?;
        self._check_id(&id)?;

        self.wallet_service
            .update_record_tags(wallet_handle, &type_, &id, &tags)
            .await?;

        debug!("update_record_tags < ()");
        Ok(())
    }

    /// Add new tags to the wallet record.
    ///
    /// Tags that already exist with the same name are replaced, the rest are kept.
    pub async fn add_record_tags(
        &self,
        wallet_handle: WalletHandle,
        type_: String,
        id: String,
        tags: Tags,
    ) -> IndyResult<()> {
        debug!(
            "add_record_tags > wallet_handle {:?} type_ {:?} id {:?} tags {:?}",
            wallet_handle,
            type_,
            id,
            secret!(&tags)
        );

        self._check_type(&type_)?;
        self._check_id(&id)?;

        self.wallet_service
            .add_record_tags(wallet_handle, &type_, &id, &tags)
            .await?;

        debug!("add_record_tags < ()");
        Ok(())
    }

    /// Delete tags from the wallet record
    ///
    /// #Params
    /// tag_names: the list of tag names to remove from the record, e.g. ["tagName1", "~tagName2"]
    pub async fn delete_record_tags(
        &self,
        wallet_handle: WalletHandle,
        type_: String,
        id: String,
        tag_names: Vec<String>,
    ) -> IndyResult<()> {
        debug!(
            "delete_record_tags > wallet_handle {:?} type_ {:?} id {:?} tag_names {:?}",
            wallet_handle, type_, id, tag_names
        );

        self._check_type(&type_)?;
        self._check_id(&id)?;

        let tag_names: Vec<&str> = tag_names.iter().map(String::as_str).collect();

        self.wallet_service
            .delete_record_tags(wallet_handle, &type_, &id, &tag_names)
            .await?;

        debug!("delete_record_tags < ()");
        Ok(())
    }

    /// Delete an existing wallet record in the wallet
    pub async fn delete_record(
        &self,
        wallet_handle: WalletHandle,
        type_: String,
        id: String,
    ) -> IndyResult<()> {
        debug!(
            "delete_record > wallet_handle {:?} type_ {:?} id {:?}",
            wallet_handle, type_, id
        );

        self._check_type(&type_)?;
        self._check_id(&id)?;

        self.wallet_service
            .delete_record(wallet_handle, &type_, &id)
            .await?;

        debug!("delete_record < ()");
        Ok(())
    }

    /// Get an wallet record by id
    ///
    /// #Params
    /// options:
    ///  {
    ///    retrieveType: (optional, false by default) Retrieve record type,
    ///    retrieveValue: (optional, true by default) Retrieve record value,
    ///    retrieveTags: (optional, false by default) Retrieve record tags
    ///  }
    ///
    /// #Returns
    /// wallet record:
    /// {
    ///   id: "Some id",
    ///   type: "Some type", // present only if retrieveType set to true
    ///   value: "Some value", // present only if retrieveValue set to true
    ///   tags: <tags json>, // present only if retrieveTags set to true
    /// }
    pub async fn get_record(
        &self,
        wallet_handle: WalletHandle,
        type_: String,
        id: String,
        options: RecordOptions,
    ) -> IndyResult<WalletRecord> {
        debug!(
            "get_record > wallet_handle {:?} type_ {:?} id {:?} options {:?}",
            wallet_handle, type_, id, options
        );

        self._check_type(&type_)?;
        self._check_id(&id)?;

        let res = self
            .wallet_service
            .get_record(wallet_handle, &type_, &id, &options)
            .await?;

        debug!("get_record < {:?}", res);
        Ok(res)
    }

    /// Search for wallet records.
    ///
    /// Note instead of immediately returning of fetched records
    /// this call returns wallet_search_handle that can be used later
    /// to fetch records by small batches (with fetch_search_next_records).
    ///
    /// #Params
    /// query: MongoDB style query to wallet record tags:
    ///  {
    ///    "tagName": "tagValue",
    ///    $or: {
    ///      "tagName2": { $regex: 'pattern' },
    ///      "tagName3": { $gte: '123' },
    ///    },
    ///  }
    /// options:
    ///  {
    ///    retrieveRecords: (optional, true by default) If false only "counts" will be calculated,
    ///    retrieveTotalCount: (optional, false by default) Calculate total count,
    ///    retrieveType: (optional, false by default) Retrieve record type,
    ///    retrieveValue: (optional, true by default) Retrieve record value,
    ///    retrieveTags: (optional, false by default) Retrieve record tags,
    ///  }
    pub async fn open_search(
        &self,
        wallet_handle: WalletHandle,
        type_: String,
        query: Query,
        options: SearchOptions,
    ) -> IndyResult<SearchHandle> {
        debug!(
            "open_search > wallet_handle {:?} type_ {:?} query {:?} options {:?}",
            wallet_handle, type_, query, options
        );

        self._check_type(&type_)?;

        let search = self
            .wallet_service
            .search_records(wallet_handle, &type_, query, &options)
            .await?;

        let search_handle =
            self.wallet_service
                .register_search(wallet_handle, SearchScope::Records, search)?;

        debug!("open_search < {:?}", search_handle);
        Ok(search_handle)
    }

    /// Fetch next records for wallet search.
    ///
    /// `records` is absent once the search is exhausted.
    ///
    /// #Returns
    /// wallet records:
    /// {
    ///   totalCount: <str>, // present only if retrieveTotalCount set to true
    ///   records: [{ // present only if retrieveRecords set to true
    ///       id: "Some id",
    ///       type: "Some type", // present only if retrieveType set to true
    ///       value: "Some value", // present only if retrieveValue set to true
    ///       tags: <tags json>, // present only if retrieveTags set to true
    ///   }],
    /// }
    pub async fn fetch_search_next_records(
        &self,
        wallet_handle: WalletHandle,
        wallet_search_handle: SearchHandle,
        count: usize,
    ) -> IndyResult<SearchRecords> {
        debug!(
            "fetch_search_next_records > wallet_handle {:?} wallet_search_handle {:?} count {:?}",
            wallet_handle, wallet_search_handle, count
        );

        self.wallet_service.check(wallet_handle)?;

        let search = self
            .wallet_service
            .get_search(wallet_search_handle, SearchScope::Records)?;

        let mut search = search.lock().await;

        let mut records: Vec<WalletRecord> = Vec::new();

        for _ in 0..count {
            match search.fetch_next_record().await? {
                Some(record) => records.push(record),
                None => break,
            }
        }

        let res = SearchRecords {
            total_count: search.get_total_count()?,
            records: if records.is_empty() {
                None
            } else {
                Some(records)
            },
        };

        debug!("fetch_search_next_records < {:?}", res);
        Ok(res)
    }

    /// Close wallet search (make search handle invalid)
    pub async fn close_search(&self, wallet_search_handle: SearchHandle) -> IndyResult<()> {
        debug!(
            "close_search > wallet_search_handle {:?}",
            wallet_search_handle
        );

        if wallet_search_handle == INVALID_SEARCH_HANDLE {
            return Err(err_msg(
                IndyErrorKind::InvalidStructure,
                "Invalid search handle",
            ));
        }

        self.wallet_service
            .close_search(wallet_search_handle, SearchScope::Records)?;

        debug!("close_search < ()");
        Ok(())
    }

    fn _check_type(&self, type_: &str) -> IndyResult<()> {
        if type_.is_empty() {
            return Err(err_msg(
                IndyErrorKind::InvalidStructure,
                "A type-name is required",
            ));
        }

        if type_.starts_with(&format!("{}::", WalletService::PREFIX)) {
            return Err(err_msg(
                IndyErrorKind::WalletAccessFailed,
                format!("Record of type \"{}\" is not available for fetching", type_),
            ));
        }

        Ok(())
    }

    fn _check_id(&self, id: &str) -> IndyResult<()> {
        if id.is_empty() {
            return Err(err_msg(
                IndyErrorKind::InvalidStructure,
                "An id is required",
            ));
        }

        Ok(())
    }
}
