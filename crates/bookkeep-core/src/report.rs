//! Named report expressions. A reporting engine asks for a value by name and
//! gets back display-ready text.

use std::collections::BTreeMap;

use bookkeep_domain::{Book, CapitalGain, Holding};
use chrono::NaiveDate;
use tracing::debug;

use crate::{
    account_service::AccountService,
    money::{format_percent, format_shares, round_cents, MoneyFormatter},
    portfolio_service::PortfolioService,
    CoreError,
};

/// Everything an expression may read.
pub struct ReportContext<'a> {
    pub book: &'a Book,
    pub holdings: Vec<Holding>,
    pub gains: Vec<CapitalGain>,
    pub money: MoneyFormatter,
    pub as_of: NaiveDate,
}

impl<'a> ReportContext<'a> {
    pub fn new(book: &'a Book, as_of: NaiveDate, money: MoneyFormatter) -> Self {
        let analysis = PortfolioService::analyze(book, as_of);
        Self {
            book,
            holdings: analysis.holdings,
            gains: analysis.gains,
            money,
            as_of,
        }
    }

    /// Linear scan by exact security name.
    pub fn holding(&self, security_name: &str) -> Option<&Holding> {
        self.holdings
            .iter()
            .find(|holding| holding.security_name == security_name)
    }
}

pub trait ReportExpression: Send + Sync {
    fn name(&self) -> &str;

    fn evaluate(&self, ctx: &ReportContext<'_>, arg: &str) -> String;
}

struct HoldingCost;

impl ReportExpression for HoldingCost {
    fn name(&self) -> &str {
        "holding.cost"
    }

    fn evaluate(&self, ctx: &ReportContext<'_>, arg: &str) -> String {
        ctx.holding(arg)
            .map(|h| ctx.money.format(h.total_cost))
            .unwrap_or_default()
    }
}

struct HoldingShares;

impl ReportExpression for HoldingShares {
    fn name(&self) -> &str {
        "holding.shares"
    }

    fn evaluate(&self, ctx: &ReportContext<'_>, arg: &str) -> String {
        ctx.holding(arg)
            .map(|h| format_shares(h.total_shares))
            .unwrap_or_default()
    }
}

struct HoldingYield;

impl ReportExpression for HoldingYield {
    fn name(&self) -> &str {
        "holding.yield"
    }

    fn evaluate(&self, ctx: &ReportContext<'_>, arg: &str) -> String {
        ctx.holding(arg)
            .map(|h| format_percent(h.annual_yield))
            .unwrap_or_default()
    }
}

struct AccountBalance;

impl ReportExpression for AccountBalance {
    fn name(&self) -> &str {
        "account.balance"
    }

    fn evaluate(&self, ctx: &ReportContext<'_>, arg: &str) -> String {
        ctx.book
            .account_by_name(arg)
            .map(|account| ctx.money.format(AccountService::balance(ctx.book, account.id)))
            .unwrap_or_default()
    }
}

struct GainsTotal;

impl ReportExpression for GainsTotal {
    fn name(&self) -> &str {
        "gains.total"
    }

    fn evaluate(&self, ctx: &ReportContext<'_>, _arg: &str) -> String {
        let total: f64 = ctx.gains.iter().map(CapitalGain::gain).sum();
        ctx.money.format(round_cents(total))
    }
}

#[derive(Default)]
pub struct ExpressionRegistry {
    expressions: BTreeMap<String, Box<dyn ReportExpression>>,
}

impl ExpressionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(HoldingCost));
        registry.register(Box::new(HoldingShares));
        registry.register(Box::new(HoldingYield));
        registry.register(Box::new(AccountBalance));
        registry.register(Box::new(GainsTotal));
        registry
    }

    /// Registers `expression`, replacing any with the same name.
    pub fn register(&mut self, expression: Box<dyn ReportExpression>) {
        self.expressions
            .insert(expression.name().to_string(), expression);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.expressions.keys().map(String::as_str)
    }

    pub fn evaluate(
        &self,
        ctx: &ReportContext<'_>,
        name: &str,
        arg: &str,
    ) -> Result<String, CoreError> {
        let expression = self
            .expressions
            .get(name)
            .ok_or_else(|| CoreError::UnknownExpression(name.to_string()))?;
        debug!(expression = name, arg, "evaluating report expression");
        Ok(expression.evaluate(ctx, arg))
    }
}

#[cfg(test)]
mod tests {
    use bookkeep_domain::{
        Account, AccountKind, InvestmentAction, InvestmentDetail, Security, Transaction,
    };

    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn book() -> Book {
        let mut book = Book::new("Reports");
        let account = Account::new("Brokerage", AccountKind::Investment).with_opening_balance(5000.0);
        let security = Security::new("Acme Corp", "ACME");
        let detail = |action, shares| InvestmentDetail::new(security.id, action, shares);
        book.transactions.push(
            Transaction::new(account.id, ymd(2024, 1, 5), "Buy", -1234.5)
                .with_investment(detail(InvestmentAction::Buy, 12.5)),
        );
        book.transactions.push(
            Transaction::new(account.id, ymd(2024, 6, 5), "Dividend", 24.69)
                .with_investment(detail(InvestmentAction::Dividend, 0.0)),
        );
        book.accounts.push(account);
        book.securities.push(security);
        book
    }

    #[test]
    fn holding_expressions_format_values() {
        let book = book();
        let ctx = ReportContext::new(&book, ymd(2024, 12, 31), MoneyFormatter::default());
        let registry = ExpressionRegistry::with_builtins();

        assert_eq!(registry.evaluate(&ctx, "holding.cost", "Acme Corp").unwrap(), "1,234.50");
        assert_eq!(registry.evaluate(&ctx, "holding.shares", "Acme Corp").unwrap(), "12.5");
        assert_eq!(registry.evaluate(&ctx, "holding.yield", "Acme Corp").unwrap(), "2.00%");
        assert_eq!(registry.evaluate(&ctx, "account.balance", "brokerage").unwrap(), "3,790.19");
        assert_eq!(registry.evaluate(&ctx, "gains.total", "").unwrap(), "0.00");
    }

    #[test]
    fn unknown_security_is_blank_and_unknown_expression_fails() {
        let book = book();
        let ctx = ReportContext::new(&book, ymd(2024, 12, 31), MoneyFormatter::default());
        let registry = ExpressionRegistry::with_builtins();

        assert_eq!(registry.evaluate(&ctx, "holding.cost", "acme corp").unwrap(), "");
        assert!(matches!(
            registry.evaluate(&ctx, "holding.price", "Acme Corp"),
            Err(CoreError::UnknownExpression(name)) if name == "holding.price"
        ));
        assert_eq!(registry.names().count(), 5);
    }
}
