use super::registry::OrganizationRegistry;
use crate::domain::account::{BalanceView, LedgerAccount};
use crate::domain::asset::{Amount, Settlement, Symbol};
use crate::domain::command::Command;
use crate::domain::event::LedgerEvent;
use crate::domain::identity::{Identity, Invocation};
use crate::domain::organization::Organization;
use crate::domain::ports::{AssetTransferBox, EventSinkBox, LedgerStoreBox, StateChanges};
use crate::domain::roles::{Role, Roles};
use crate::error::{LedgerError, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Arguments of the one-time `Initialize` call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InitializeInput {
    pub admin: Identity,
    pub treasurer: Identity,
    pub fee_address: Identity,
    pub symbols: BTreeSet<Symbol>,
}

/// The escrow and fee-settlement engine.
///
/// Every mutating operation validates, computes its new state on copies,
/// performs the external transfer, commits one change set and only then emits
/// its events. A failure at any step before the commit leaves no trace.
///
/// The engine assumes its host serializes mutating calls: two concurrent calls
/// touching the same (organization, symbol) pair may lose an update.
pub struct BillingEngine {
    custody: Identity,
    store: LedgerStoreBox,
    assets: AssetTransferBox,
    events: EventSinkBox,
}

impl BillingEngine {
    /// Creates a new `BillingEngine`.
    ///
    /// # Arguments
    ///
    /// * `custody` - The identity deposits are pulled into at the asset ledger.
    /// * `store` - Where roles, organizations and balances live.
    /// * `assets` - The external asset ledger.
    /// * `events` - Receives one audit record per transition.
    pub fn new(
        custody: Identity,
        store: LedgerStoreBox,
        assets: AssetTransferBox,
        events: EventSinkBox,
    ) -> Self {
        Self {
            custody,
            store,
            assets,
            events,
        }
    }

    pub async fn initialize(&self, invocation: &Invocation, input: InitializeInput) -> Result<()> {
        if self.store.roles().await?.is_some() {
            return Err(LedgerError::AlreadyInitialized);
        }
        let roles = Roles {
            admin: input.admin,
            treasurer: input.treasurer,
            fee_address: input.fee_address,
            fee_symbols: input.symbols,
        };
        info!(
            sender = %invocation.sender,
            admin = %roles.admin,
            treasurer = %roles.treasurer,
            fee_address = %roles.fee_address,
            symbols = roles.fee_symbols.len(),
            "Ledger initialized"
        );
        self.finish(
            StateChanges {
                roles: Some(roles),
                ..Default::default()
            },
            Vec::new(),
        )
        .await
    }

    pub async fn set_admin(&self, invocation: &Invocation, admin: Identity) -> Result<()> {
        self.update_roles(invocation, "set_admin", |roles| roles.admin = admin)
            .await
    }

    pub async fn set_treasurer(&self, invocation: &Invocation, treasurer: Identity) -> Result<()> {
        self.update_roles(invocation, "set_treasurer", |roles| {
            roles.treasurer = treasurer
        })
        .await
    }

    pub async fn set_fee_address(
        &self,
        invocation: &Invocation,
        fee_address: Identity,
    ) -> Result<()> {
        self.update_roles(invocation, "set_fee_address", |roles| {
            roles.fee_address = fee_address
        })
        .await
    }

    pub async fn set_fee_symbols(
        &self,
        invocation: &Invocation,
        symbols: BTreeSet<Symbol>,
    ) -> Result<()> {
        let mut roles = self.roles().await?;
        roles.require(Role::Admin, &invocation.sender, "set_fee_symbols")?;
        let event = LedgerEvent::FeeSymbolSet {
            symbols: symbols.clone(),
        };
        roles.fee_symbols = symbols;
        info!(symbols = ?roles.fee_symbols, "Fee symbols replaced");
        self.finish(
            StateChanges {
                roles: Some(roles),
                ..Default::default()
            },
            vec![event],
        )
        .await
    }

    /// Pulls `amount` of `symbol` from the sender into custody and credits the
    /// sender's organization, creating it on the sender's first deposit.
    pub async fn deposit(&self, invocation: &Invocation, symbol: Symbol, amount: i64) -> Result<()> {
        let roles = self.roles().await?;
        if !roles.accepts(&symbol) {
            return Err(LedgerError::InvalidSymbol(symbol.to_string()));
        }
        let amount = Amount::new(amount)?;
        if invocation.sender == self.custody {
            return Err(LedgerError::ExternalTransferFailed(format!(
                "custody {} cannot deposit into itself",
                self.custody
            )));
        }

        let mut changes = StateChanges::default();
        let mut events = Vec::new();
        let organization = self
            .registry()
            .resolve_or_create(invocation, &mut changes, &mut events)
            .await?;

        let mut account = self.store.account(&organization, &symbol).await?;
        account.deposit(amount)?;

        self.assets
            .pull(&invocation.sender, &symbol, amount, &self.custody)
            .await?;

        info!(
            organization = %organization,
            depositor = %invocation.sender,
            symbol = %symbol,
            amount = amount.value(),
            balance = account.balance,
            "Deposit completed"
        );
        changes.accounts.push(account);
        events.push(LedgerEvent::Deposited {
            address: organization,
            symbol,
            amount: amount.value(),
        });
        self.finish(changes, events).await
    }

    /// Pays `amount` out of the sender's organization balance to `to`.
    pub async fn withdraw(
        &self,
        invocation: &Invocation,
        symbol: Symbol,
        amount: i64,
        to: Identity,
    ) -> Result<()> {
        self.roles().await?;
        let amount = Amount::new(amount)?;
        let organization = self.registry().lookup(&invocation.sender).await?;

        let mut account = self.store.account(&organization, &symbol).await?;
        account.withdraw(amount)?;

        self.assets.push(&to, &symbol, amount).await?;

        info!(
            organization = %organization,
            symbol = %symbol,
            amount = amount.value(),
            to = %to,
            balance = account.balance,
            "Withdrawal completed"
        );
        let event = LedgerEvent::Withdrawn {
            address: organization,
            symbol,
            amount: amount.value(),
            to_address: to,
        };
        self.finish(
            StateChanges {
                accounts: vec![account],
                ..Default::default()
            },
            vec![event],
        )
        .await
    }

    /// Escrows funds of the sender's own organization against an order.
    pub async fn lock(
        &self,
        invocation: &Invocation,
        symbol: Symbol,
        amount: i64,
        order_id: &str,
    ) -> Result<()> {
        self.roles().await?;
        let organization = self.registry().lookup(&invocation.sender).await?;
        if order_id.trim().is_empty() {
            return Err(LedgerError::InvalidOrderId);
        }
        self.lock_funds(organization, symbol, amount, order_id.to_string())
            .await
    }

    /// Treasurer-initiated escrow on any existing organization. Carries no
    /// order id.
    pub async fn lock_from(
        &self,
        invocation: &Invocation,
        organization: Identity,
        symbol: Symbol,
        amount: i64,
    ) -> Result<()> {
        let roles = self.roles().await?;
        roles.require(Role::Treasurer, &invocation.sender, "lock_from")?;
        self.registry().require_existing(&organization).await?;
        self.lock_funds(organization, symbol, amount, String::new())
            .await
    }

    /// Releases locked funds of `organization`: `charge_amount` goes to the
    /// fee address, `unlock_amount` back to the spendable balance.
    pub async fn charge(
        &self,
        invocation: &Invocation,
        organization: Identity,
        symbol: Symbol,
        charge_amount: i64,
        unlock_amount: i64,
    ) -> Result<()> {
        let roles = self.roles().await?;
        roles.require(Role::Treasurer, &invocation.sender, "charge")?;
        let settlement = Settlement::new(charge_amount, unlock_amount)?;

        let mut account = self.store.account(&organization, &symbol).await?;
        account.settle(settlement)?;

        let mut events = Vec::new();
        if settlement.charge() > 0 {
            let fee = Amount::new(settlement.charge())?;
            self.assets.push(&roles.fee_address, &symbol, fee).await?;
            events.push(LedgerEvent::FeeReceived {
                fee_address: roles.fee_address.clone(),
                symbol: symbol.clone(),
                amount: fee.value(),
                organization: organization.clone(),
            });
        }

        info!(
            organization = %organization,
            symbol = %symbol,
            charged = settlement.charge(),
            unlocked = settlement.unlock(),
            balance = account.balance,
            locked = account.locked_balance,
            "Charge settled"
        );
        events.push(LedgerEvent::Charged {
            address: organization,
            symbol,
            charged_amount: settlement.charge(),
            unlocked_amount: settlement.unlock(),
        });
        self.finish(
            StateChanges {
                accounts: vec![account],
                ..Default::default()
            },
            events,
        )
        .await
    }

    /// Dispatches a command on behalf of `invocation.sender`.
    pub async fn execute(&self, invocation: &Invocation, command: Command) -> Result<()> {
        debug!(
            command = command.name(),
            sender = %invocation.sender,
            invocation = %invocation.id,
            "Executing command"
        );
        match command {
            Command::SetAdmin(admin) => self.set_admin(invocation, admin).await,
            Command::SetTreasurer(treasurer) => self.set_treasurer(invocation, treasurer).await,
            Command::SetFeeAddress(fee_address) => {
                self.set_fee_address(invocation, fee_address).await
            }
            Command::SetFeeSymbols(symbols) => self.set_fee_symbols(invocation, symbols).await,
            Command::Deposit { symbol, amount } => self.deposit(invocation, symbol, amount).await,
            Command::Withdraw { symbol, amount, to } => {
                self.withdraw(invocation, symbol, amount, to).await
            }
            Command::Lock {
                symbol,
                amount,
                order_id,
            } => self.lock(invocation, symbol, amount, &order_id).await,
            Command::LockFrom {
                organization,
                symbol,
                amount,
            } => self.lock_from(invocation, organization, symbol, amount).await,
            Command::Charge {
                organization,
                symbol,
                charge_amount,
                unlock_amount,
            } => {
                self.charge(invocation, organization, symbol, charge_amount, unlock_amount)
                    .await
            }
        }
    }

    pub async fn get_admin(&self) -> Result<Identity> {
        Ok(self.roles().await?.admin)
    }

    pub async fn get_treasurer(&self) -> Result<Identity> {
        Ok(self.roles().await?.treasurer)
    }

    pub async fn get_fee_address(&self) -> Result<Identity> {
        Ok(self.roles().await?.fee_address)
    }

    pub async fn get_fee_symbols(&self) -> Result<BTreeSet<Symbol>> {
        Ok(self.roles().await?.fee_symbols)
    }

    /// Zero for pairs that never held funds.
    pub async fn get_balance(&self, owner: &Identity, symbol: &Symbol) -> Result<BalanceView> {
        let account = self.store.account(owner, symbol).await?;
        Ok(BalanceView::from(&account))
    }

    pub async fn get_organization(&self, address: &Identity) -> Result<Option<Organization>> {
        self.store.organization(address).await
    }

    pub async fn get_user_organization(&self, user: &Identity) -> Result<Option<Identity>> {
        self.store.organization_of(user).await
    }

    /// Every stored record, ordered by owner then symbol.
    pub async fn accounts(&self) -> Result<Vec<LedgerAccount>> {
        let mut accounts = self.store.accounts().await?;
        accounts.sort_by(|a, b| (&a.owner, &a.symbol).cmp(&(&b.owner, &b.symbol)));
        Ok(accounts)
    }

    fn registry(&self) -> OrganizationRegistry<'_> {
        OrganizationRegistry::new(self.store.as_ref())
    }

    async fn roles(&self) -> Result<Roles> {
        self.store.roles().await?.ok_or(LedgerError::NotInitialized)
    }

    async fn lock_funds(
        &self,
        organization: Identity,
        symbol: Symbol,
        amount: i64,
        order_id: String,
    ) -> Result<()> {
        let amount = Amount::new(amount)?;
        let mut account = self.store.account(&organization, &symbol).await?;
        account.lock(amount)?;

        info!(
            organization = %organization,
            symbol = %symbol,
            amount = amount.value(),
            order_id = %order_id,
            balance = account.balance,
            locked = account.locked_balance,
            "Funds locked"
        );
        let event = LedgerEvent::Locked {
            address: organization,
            symbol,
            amount: amount.value(),
            order_id,
        };
        self.finish(
            StateChanges {
                accounts: vec![account],
                ..Default::default()
            },
            vec![event],
        )
        .await
    }

    async fn update_roles(
        &self,
        invocation: &Invocation,
        operation: &'static str,
        update: impl FnOnce(&mut Roles),
    ) -> Result<()> {
        let mut roles = self.roles().await?;
        roles.require(Role::Admin, &invocation.sender, operation)?;
        update(&mut roles);
        info!(
            operation,
            admin = %roles.admin,
            treasurer = %roles.treasurer,
            fee_address = %roles.fee_address,
            "Roles updated"
        );
        self.finish(
            StateChanges {
                roles: Some(roles),
                ..Default::default()
            },
            Vec::new(),
        )
        .await
    }

    async fn finish(&self, changes: StateChanges, events: Vec<LedgerEvent>) -> Result<()> {
        self.store.commit(changes).await?;
        for event in events {
            self.events.emit(event).await?;
        }
        Ok(())
    }
}
