#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::{
        app::{
            Ledger,
            replay::replay,
            reports::{monthly_pnl, script_wise_pnl, summarize, yearly_pnl},
        },
        models::{RealizedPnl, TradeSide, Transaction},
        test::fixtures::{date, now, trade},
    };

    fn history() -> Vec<Transaction> {
        vec![
            trade(1, date(2023, 11, 2), TradeSide::Buy, 1000, dec!(10)),
            trade(2, date(2023, 12, 4), TradeSide::Sell, 200, dec!(12)),
            trade(3, date(2024, 1, 8), TradeSide::Sell, 300, dec!(9)),
            trade(4, date(2024, 1, 22), TradeSide::Sell, 100, dec!(11)),
            trade(5, date(2024, 3, 1), TradeSide::Buy, 400, dec!(8)),
        ]
    }

    fn realized(history: &[Transaction]) -> Vec<RealizedPnl> {
        replay(history, &Ledger::default(), now())
            .unwrap()
            .realized()
            .clone()
    }

    #[test]
    fn monthly_buckets_profit_and_loss() {
        let history = history();
        let records = realized(&history);
        let months = monthly_pnl(&records, None);

        assert_eq!(months.len(), 2);
        assert_eq!((*months[0].year(), *months[0].month()), (2023, 12));
        assert_eq!((*months[1].year(), *months[1].month()), (2024, 1));

        let january = &months[1];
        assert_eq!(*january.sale_count(), 2);
        assert!(*january.total_profit() > Decimal::ZERO);
        assert!(*january.total_loss() < Decimal::ZERO);
        assert_eq!(
            *january.total_pnl(),
            january.total_profit() + january.total_loss()
        );

        let only_2024 = monthly_pnl(&records, Some(2024));
        assert_eq!(only_2024, vec![january.clone()]);
    }

    #[test]
    fn yearly_is_newest_first_and_counts_all_charges() {
        let history = history();
        let records = realized(&history);
        let years = yearly_pnl(&records, &history);

        assert_eq!(years.len(), 2);
        assert_eq!(*years[0].year(), 2024);
        assert_eq!(*years[1].year(), 2023);

        let charges_2024: Decimal = history[2..]
            .iter()
            .map(|t| *t.charges().total())
            .sum();
        assert_eq!(*years[0].total_charges(), charges_2024);
        assert_eq!(*years[0].sale_count(), 2);
        assert_eq!(years[0].months().len(), 1);
    }

    #[test]
    fn summary_totals() {
        let history = history();
        let replayed = replay(&history, &Ledger::default(), now()).unwrap();
        let holding = replayed.holding().clone().unwrap();
        let summary = summarize(vec![holding.clone()], &history);

        let recovered: Decimal = history
            .iter()
            .filter(|t| *t.side() == TradeSide::Sell)
            .map(|t| *t.net_amount())
            .sum();
        assert_eq!(*summary.total_recovered(), recovered);
        assert_eq!(*summary.total_shares_held(), 800);
        assert_eq!(*summary.active_symbol_count(), 1);
        assert_eq!(*summary.total_realized_pnl(), *holding.total_realized_pnl());
    }

    #[test]
    fn script_statistics() {
        let history = history();
        let replayed = replay(&history, &Ledger::default(), now()).unwrap();
        let holdings = vec![replayed.holding().clone().unwrap()];
        let scripts = script_wise_pnl(&holdings, &history);

        assert_eq!(scripts.len(), 1);
        let trg = &scripts[0];
        assert_eq!(trg.symbol(), "TRG");
        assert_eq!(*trg.total_quantity_traded(), 2000);
        assert_eq!(*trg.avg_buy_rate(), dec!(9));
        assert_eq!(*trg.avg_sell_rate(), dec!(10.6667));
        assert_eq!(*trg.available_quantity(), 800);
    }
}
