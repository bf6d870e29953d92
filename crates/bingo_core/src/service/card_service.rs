//! Card use-case service.
//!
//! # Responsibility
//! - Register a new owner (account + card + empty cells) or load an existing one.
//! - Open the private editable view and the public read-only view.
//! - Dispatch queued view-model mutations to the grid gateway.
//!
//! # Invariants
//! - Names are trimmed and must not be blank.
//! - A card's cells are created in one batch together with the card.
//! - Service APIs never bypass repository persistence contracts.

use crate::interaction::config::InteractionConfig;
use crate::interaction::view_model::GridViewModel;
use crate::model::account::{normalize_account_name, Account, AccountId};
use crate::model::grid::{Grid, GridId, GridLayout, GridValidationError};
use crate::repo::account_repo::AccountRepository;
use crate::repo::grid_repo::{GridRepository, OwnerRef};
use crate::repo::RepoError;
use crate::service::dispatch::{dispatch_mutations, DispatchReport};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from card use-cases.
#[derive(Debug)]
pub enum CardServiceError {
    /// Name is blank after trim.
    InvalidName,
    InvalidLayout(GridValidationError),
    /// No card for the requested owner or id.
    NotFound(OwnerRef),
    Repo(RepoError),
}

impl Display for CardServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "please enter your name"),
            Self::InvalidLayout(err) => write!(f, "{err}"),
            Self::NotFound(OwnerRef::Account(id)) => {
                write!(f, "bingo card not found for account {id}")
            }
            Self::NotFound(OwnerRef::Grid(id)) => write!(f, "bingo card not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CardServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidLayout(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CardServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<GridValidationError> for CardServiceError {
    fn from(value: GridValidationError) -> Self {
        Self::InvalidLayout(value)
    }
}

/// Outcome of [`CardService::register_or_load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub account: Account,
    pub grid_id: GridId,
    /// `true` when the card was created by this call.
    pub created: bool,
}

/// Card service facade over account and grid repositories.
pub struct CardService<A: AccountRepository, G: GridRepository> {
    accounts: A,
    grids: G,
    config: InteractionConfig,
}

impl<A: AccountRepository, G: GridRepository> CardService<A, G> {
    pub fn new(accounts: A, grids: G) -> Self {
        Self {
            accounts,
            grids,
            config: InteractionConfig::default(),
        }
    }

    /// Replaces the interaction config used for opened views.
    pub fn with_config(mut self, config: InteractionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn grids(&self) -> &G {
        &self.grids
    }

    /// Loads the named owner's card, creating owner and card on first visit.
    ///
    /// `layout` only applies to newly created cards.
    pub fn register_or_load(
        &self,
        name: &str,
        layout: GridLayout,
    ) -> Result<Registration, CardServiceError> {
        let name = normalize_account_name(name).ok_or(CardServiceError::InvalidName)?;
        layout.validate()?;

        if let Some(account) = self.accounts.find_account_by_name(&name)? {
            if let Some(grid) = self.grids.fetch_grid(OwnerRef::Account(account.id))? {
                info!(
                    "event=card_register module=service status=ok created=false account_id={} grid_id={}",
                    account.id, grid.id
                );
                return Ok(Registration {
                    account,
                    grid_id: grid.id,
                    created: false,
                });
            }
            let grid_id = self.create_card(account.id, layout)?;
            return Ok(Registration {
                account,
                grid_id,
                created: true,
            });
        }

        let account = self.accounts.create_account(&name)?;
        let grid_id = self.create_card(account.id, layout)?;
        Ok(Registration {
            account,
            grid_id,
            created: true,
        })
    }

    /// Opens the owner's editable card.
    pub fn open_private_card(&self, owner: AccountId) -> Result<GridViewModel, CardServiceError> {
        let grid = self.load(OwnerRef::Account(owner))?;
        Ok(GridViewModel::new(grid, false, &self.config))
    }

    /// Opens someone's card for viewing only.
    pub fn open_public_card(&self, grid_id: GridId) -> Result<GridViewModel, CardServiceError> {
        let grid = self.load(OwnerRef::Grid(grid_id))?;
        Ok(GridViewModel::new(grid, true, &self.config))
    }

    /// Sends queued mutations to the grid gateway.
    pub fn dispatch(&self, view: &mut GridViewModel) -> DispatchReport {
        dispatch_mutations(&self.grids, view)
    }

    fn load(&self, owner: OwnerRef) -> Result<Grid, CardServiceError> {
        match self.grids.fetch_grid(owner) {
            Ok(Some(grid)) => Ok(grid),
            Ok(None) => {
                info!("event=card_open module=service status=not_found owner={owner:?}");
                Err(CardServiceError::NotFound(owner))
            }
            Err(err) => {
                error!("event=card_open module=service status=error owner={owner:?} error={err}");
                Err(err.into())
            }
        }
    }

    fn create_card(&self, owner: AccountId, layout: GridLayout) -> Result<GridId, CardServiceError> {
        let grid = Grid::new(owner, layout)?;
        let grid_id = self.grids.create_grid(&grid)?;
        info!(
            "event=card_register module=service status=ok created=true account_id={} grid_id={} cells={}",
            owner,
            grid_id,
            grid.cells.len()
        );
        Ok(grid_id)
    }
}
