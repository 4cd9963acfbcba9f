use std::{collections::HashMap, sync::Arc};

use indy_api_types::{errors::prelude::*, WalletHandle};
use indy_utils::wql::Query;
use indy_wallet::{RecordOptions, SearchOptions, WalletService};

use crate::{
    controllers::parse_record_value,
    domain::{
        crypto::did::{Did, DidValue, TheirDid},
        pairwise::{Pairwise, PairwiseInfo},
    },
};

pub struct PairwiseController {
    wallet_service: Arc<WalletService>,
}

impl PairwiseController {
    pub(crate) fn new(wallet_service: Arc<WalletService>) -> PairwiseController {
        PairwiseController { wallet_service }
    }

    /// Check if pairwise is exists.
    pub async fn is_pairwise_exists(
        &self,
        wallet_handle: WalletHandle,
        their_did: DidValue,
    ) -> IndyResult<bool> {
        debug!(
            "is_pairwise_exists > wallet_handle {:?} their_did {:?}",
            wallet_handle, their_did
        );

        let res = self
            .wallet_service
            .record_exists::<Pairwise>(wallet_handle, &their_did.0)
            .await?;

        debug!("is_pairwise_exists < {:?}", res);
        Ok(res)
    }

    /// Creates pairwise.
    ///
    /// #Params
    /// wallet_handle: wallet handler (created by open_wallet).
    /// their_did: encrypting DID, must be stored with `store_their_did`
    /// my_did: encrypting DID, must be created with `create_and_store_my_did`
    /// metadata Optional: extra information for pairwise
    ///
    /// #Errors
    /// Common*
    /// Wallet*
    pub async fn create_pairwise(
        &self,
        wallet_handle: WalletHandle,
        their_did: DidValue,
        my_did: DidValue,
        metadata: Option<String>,
    ) -> IndyResult<()> {
        debug!(
            "create_pairwise > wallet_handle {:?} their_did {:?} my_did {:?} metadata {:?}",
            wallet_handle, their_did, my_did, metadata
        );

        self.wallet_service
            .get_indy_record::<Did>(wallet_handle, &my_did.0, &RecordOptions::id())
            .await?;

        self.wallet_service
            .get_indy_record::<TheirDid>(wallet_handle, &their_did.0, &RecordOptions::id())
            .await?;

        let pairwise = Pairwise {
            my_did,
            their_did,
            metadata,
        };

        self.wallet_service
            .add_indy_object(wallet_handle, &pairwise.their_did.0, &pairwise, &HashMap::new())
            .await?;

        debug!("create_pairwise < ()");
        Ok(())
    }

    /// Get list of saved pairwise.
    pub async fn list_pairwise(&self, wallet_handle: WalletHandle) -> IndyResult<Vec<Pairwise>> {
        debug!("list_pairwise > wallet_handle {:?}", wallet_handle);

        let mut search = self
            .wallet_service
            .search_indy_records::<Pairwise>(
                wallet_handle,
                Query::default(),
                &SearchOptions::id_value(),
            )
            .await?;

        let mut list_pairwise: Vec<Pairwise> = Vec::new();

        while let Some(record) = search.fetch_next_record().await? {
            list_pairwise.push(parse_record_value(&record)?);
        }

        debug!("list_pairwise < {:?}", list_pairwise);
        Ok(list_pairwise)
    }

    /// Gets pairwise information for specific their_did.
    ///
    /// #Returns
    /// pairwise_info: did info associated with their did
    ///
    /// #Errors
    /// Common*
    /// Wallet*
    pub async fn get_pairwise(
        &self,
        wallet_handle: WalletHandle,
        their_did: DidValue,
    ) -> IndyResult<PairwiseInfo> {
        debug!(
            "get_pairwise > wallet_handle {:?} their_did {:?}",
            wallet_handle, their_did
        );

        let pairwise: Pairwise = self
            .wallet_service
            .get_indy_object(wallet_handle, &their_did.0, &RecordOptions::id_value())
            .await?;

        let res = PairwiseInfo::from(pairwise);

        debug!("get_pairwise < {:?}", res);
        Ok(res)
    }

    /// Save some data in the Wallet for pairwise associated with Did. `None`
    /// clears the metadata.
    pub async fn set_pairwise_metadata(
        &self,
        wallet_handle: WalletHandle,
        their_did: DidValue,
        metadata: Option<String>,
    ) -> IndyResult<()> {
        debug!(
            "set_pairwise_metadata > wallet_handle {:?} their_did {:?} metadata {:?}",
            wallet_handle, their_did, metadata
        );

        let mut pairwise: Pairwise = self
            .wallet_service
            .get_indy_object(wallet_handle, &their_did.0, &RecordOptions::id_value())
            .await?;

        pairwise.metadata = metadata;

        self.wallet_service
            .update_indy_object(wallet_handle, &their_did.0, &pairwise)
            .await?;

        debug!("set_pairwise_metadata < ()");
        Ok(())
    }
}
