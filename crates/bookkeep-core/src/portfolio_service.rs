//! Holdings and realized gains computed from investment transactions.

use std::collections::VecDeque;

use bookkeep_domain::{
    round_cents, Book, CapitalGain, Holding, InvestmentAction, Security, Transaction,
};
use chrono::{Duration, NaiveDate};
use tracing::{debug, warn};

const SHARE_EPSILON: f64 = 1e-9;
const YIELD_WINDOW_DAYS: i64 = 365;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortfolioAnalysis {
    pub holdings: Vec<Holding>,
    pub gains: Vec<CapitalGain>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EventKind {
    Split,
    Buy,
    Sell,
    Dividend,
}

#[derive(Debug, Clone, Copy)]
struct Event {
    date: NaiveDate,
    kind: EventKind,
    shares: f64,
    amount: f64,
}

#[derive(Debug, Clone)]
struct Lot {
    purchased: NaiveDate,
    shares: f64,
    cost: f64,
}

pub struct PortfolioService;

impl PortfolioService {
    pub fn holdings(book: &Book, as_of: NaiveDate) -> Vec<Holding> {
        Self::analyze(book, as_of).holdings
    }

    pub fn capital_gains(book: &Book, as_of: NaiveDate) -> Vec<CapitalGain> {
        Self::analyze(book, as_of).gains
    }

    /// Replays every security's events up to `as_of`. Open positions become
    /// holdings; each sell produces one gain per lot slice it consumes.
    pub fn analyze(book: &Book, as_of: NaiveDate) -> PortfolioAnalysis {
        let mut analysis = PortfolioAnalysis::default();
        for security in &book.securities {
            let events = collect_events(security, &book.transactions, as_of);
            if events.is_empty() {
                continue;
            }
            let (holding, gains) = replay(security, &events, as_of);
            analysis.gains.extend(gains);
            if let Some(holding) = holding {
                analysis.holdings.push(holding);
            }
        }
        debug!(
            holdings = analysis.holdings.len(),
            gains = analysis.gains.len(),
            "portfolio analyzed"
        );
        analysis
    }
}

fn collect_events(security: &Security, transactions: &[Transaction], as_of: NaiveDate) -> Vec<Event> {
    let mut events: Vec<Event> = transactions
        .iter()
        .filter(|txn| txn.date <= as_of)
        .filter_map(|txn| {
            let detail = txn.investment.as_ref()?;
            if detail.security_id != security.id {
                return None;
            }
            let kind = match detail.action {
                InvestmentAction::Buy => EventKind::Buy,
                InvestmentAction::Sell => EventKind::Sell,
                InvestmentAction::Dividend => EventKind::Dividend,
            };
            Some(Event {
                date: txn.date,
                kind,
                shares: detail.shares.abs(),
                amount: txn.amount.abs(),
            })
        })
        .collect();
    if events.is_empty() {
        return events;
    }
    events.extend(
        security
            .splits()
            .filter(|entry| entry.date <= as_of)
            .map(|entry| Event {
                date: entry.date,
                kind: EventKind::Split,
                shares: entry.split_ratio.multiplier(),
                amount: 0.0,
            }),
    );
    events.sort_by(|a, b| a.date.cmp(&b.date).then(a.kind.cmp(&b.kind)));
    events
}

fn replay(security: &Security, events: &[Event], as_of: NaiveDate) -> (Option<Holding>, Vec<CapitalGain>) {
    let mut lots: VecDeque<Lot> = VecDeque::new();
    let mut gains = Vec::new();
    let mut dividends = 0.0;
    let window_start = as_of - Duration::days(YIELD_WINDOW_DAYS);

    for event in events {
        match event.kind {
            EventKind::Split => {
                for lot in lots.iter_mut() {
                    lot.shares *= event.shares;
                }
            }
            EventKind::Buy => lots.push_back(Lot {
                purchased: event.date,
                shares: event.shares,
                cost: event.amount,
            }),
            EventKind::Sell => sell(security, &mut lots, event, &mut gains),
            EventKind::Dividend => {
                if event.date > window_start {
                    dividends += event.amount;
                }
            }
        }
    }

    let total_shares: f64 = lots.iter().map(|lot| lot.shares).sum();
    if total_shares <= SHARE_EPSILON {
        return (None, gains);
    }
    let total_cost = round_cents(lots.iter().map(|lot| lot.cost).sum());
    let annual_yield = if total_cost > 0.0 {
        dividends / total_cost * 100.0
    } else {
        0.0
    };
    let holding = Holding {
        security_id: security.id,
        security_name: security.name.clone(),
        total_shares,
        total_cost,
        annual_yield,
        latest_price: security.price_on_or_before(as_of).map(|entry| entry.price),
    };
    (Some(holding), gains)
}

fn sell(security: &Security, lots: &mut VecDeque<Lot>, event: &Event, gains: &mut Vec<CapitalGain>) {
    if event.shares <= SHARE_EPSILON {
        return;
    }
    let mut remaining = event.shares;
    while remaining > SHARE_EPSILON {
        let Some(lot) = lots.front_mut() else {
            break;
        };
        let taken = remaining.min(lot.shares);
        let basis = lot.cost * taken / lot.shares;
        gains.push(CapitalGain::new(
            security.id,
            security.name.clone(),
            lot.purchased,
            event.date,
            taken,
            basis,
            event.amount * taken / event.shares,
        ));
        lot.shares -= taken;
        lot.cost -= basis;
        remaining -= taken;
        if lot.shares <= SHARE_EPSILON {
            lots.pop_front();
        }
    }
    if remaining > SHARE_EPSILON {
        warn!(
            security = %security.name,
            shares = remaining,
            date = %event.date,
            "sold more shares than held; remainder has no cost basis"
        );
        gains.push(CapitalGain::new(
            security.id,
            security.name.clone(),
            event.date,
            event.date,
            remaining,
            0.0,
            event.amount * remaining / event.shares,
        ));
    }
}
