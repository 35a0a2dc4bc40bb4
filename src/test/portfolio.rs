#[cfg(test)]
mod tests {
    use std::{io::Write, sync::Arc};

    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::{
        app::{ChargeSchedule, InvestedAmountPolicy},
        error::PortfolioError,
        models::{
            MAX_QUANTITY, MAX_RATE, RealizedPnl, RealizedPnlFilter, TradeSide, TransactionFilter,
        },
        test::fixtures::{buy, date, portfolio, sell},
    };

    #[tokio::test]
    async fn trg_scenario_is_persisted() {
        let (portfolio, _dir) = portfolio(InvestedAmountPolicy::Retain).await;

        let bought = portfolio
            .create_transaction(buy("TRG", date(2024, 1, 10), 100, dec!(85.50)))
            .await
            .unwrap();
        assert_eq!(*bought.charges().total(), dec!(15.25));
        assert_eq!(*bought.net_amount(), dec!(8565.25));

        let holding = portfolio.get_holding("TRG").await.unwrap();
        assert_eq!(*holding.available_quantity(), 100);
        assert_eq!(*holding.avg_cost_per_share(), dec!(85.6525));

        let sold = portfolio
            .create_transaction(sell("trg", date(2024, 2, 1), 50, dec!(92.00)))
            .await
            .unwrap();
        assert_eq!(sold.symbol(), "TRG");

        let realized = portfolio
            .list_realized_pnl(RealizedPnlFilter::default())
            .await
            .unwrap();
        assert_eq!(realized.len(), 1);
        assert!(realized[0].id().is_some());
        assert_eq!(realized[0].transaction_id(), sold.id());
        assert_eq!(*realized[0].quantity_sold(), 50);
        assert_eq!(*realized[0].realized_pnl(), dec!(309.185));

        let holding = portfolio.get_holding("TRG").await.unwrap();
        assert_eq!(*holding.available_quantity(), 50);
        assert_eq!(*holding.total_realized_pnl(), dec!(309.185));

        let stored = portfolio.get_transaction(*sold.id()).await.unwrap();
        assert_eq!(stored, sold);
    }

    #[tokio::test]
    async fn sell_without_holding_leaves_nothing_behind() {
        let (portfolio, _dir) = portfolio(InvestedAmountPolicy::Retain).await;

        let err = portfolio
            .create_transaction(sell("TRG", date(2024, 2, 1), 999_999, dec!(92)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PortfolioError::InsufficientQuantity { available: 0, .. }
        ));

        assert!(matches!(
            portfolio.get_holding("TRG").await,
            Err(PortfolioError::NotFound(_))
        ));
        let page = portfolio
            .list_transactions(TransactionFilter::default())
            .await
            .unwrap();
        assert_eq!(*page.total(), 0);
        assert!(
            portfolio
                .list_realized_pnl(RealizedPnlFilter::default())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn invalid_input_is_rejected() {
        let (portfolio, _dir) = portfolio(InvestedAmountPolicy::Retain).await;

        let cases = vec![
            buy("TRG", date(2024, 6, 29), 100, dec!(85)),
            buy("TRG", date(2024, 1, 2), 0, dec!(85)),
            buy("TRG", date(2024, 1, 2), 100, dec!(-1)),
            buy("TRG", date(2024, 1, 2), 100, dec!(85.12345)),
            buy("TR G", date(2024, 1, 2), 100, dec!(85)),
            buy("", date(2024, 1, 2), 100, dec!(85)),
            buy("TRG", date(2024, 1, 2), MAX_QUANTITY + 1, dec!(1)),
            buy("TRG", date(2024, 1, 2), 1, MAX_RATE + dec!(0.01)),
            buy("TRG", date(2024, 1, 2), 1_000_000_000_000_000_000, dec!(1_000_000_000_000)),
        ];
        for input in cases {
            let err = portfolio.create_transaction(input).await.unwrap_err();
            assert!(matches!(err, PortfolioError::Validation(_)), "{err}");
        }
        assert!(portfolio.get_holdings().await.unwrap().is_empty());

        let largest = portfolio
            .create_transaction(buy("TRG", date(2024, 1, 2), MAX_QUANTITY, MAX_RATE))
            .await
            .unwrap();
        assert_eq!(*largest.amount(), dec!(1_000_000_000_000_000));
    }

    #[tokio::test]
    async fn deleting_the_buy_under_a_sell_fails_and_keeps_state() {
        let (portfolio, _dir) = portfolio(InvestedAmountPolicy::Retain).await;

        let bought = portfolio
            .create_transaction(buy("TRG", date(2024, 1, 10), 100, dec!(85.50)))
            .await
            .unwrap();
        let sold = portfolio
            .create_transaction(sell("TRG", date(2024, 2, 1), 50, dec!(92)))
            .await
            .unwrap();

        let err = portfolio.delete_transaction(*bought.id()).await.unwrap_err();
        match err {
            PortfolioError::Consistency { transaction_id, .. } => {
                assert_eq!(transaction_id, *sold.id())
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(portfolio.get_transaction(*bought.id()).await.is_ok());
        let holding = portfolio.get_holding("TRG").await.unwrap();
        assert_eq!(*holding.available_quantity(), 50);
        assert_eq!(
            portfolio
                .list_realized_pnl(RealizedPnlFilter::default())
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn deleting_a_sell_restores_the_holding() {
        let (portfolio, _dir) = portfolio(InvestedAmountPolicy::Retain).await;

        portfolio
            .create_transaction(buy("TRG", date(2024, 1, 10), 100, dec!(85.50)))
            .await
            .unwrap();
        let before = portfolio.get_holding("TRG").await.unwrap();
        let sold = portfolio
            .create_transaction(sell("TRG", date(2024, 2, 1), 50, dec!(92)))
            .await
            .unwrap();

        portfolio.delete_transaction(*sold.id()).await.unwrap();

        assert_eq!(portfolio.get_holding("TRG").await.unwrap(), before);
        assert!(
            portfolio
                .list_realized_pnl(RealizedPnlFilter::default())
                .await
                .unwrap()
                .is_empty()
        );
        assert!(matches!(
            portfolio.delete_transaction(*sold.id()).await,
            Err(PortfolioError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_and_recreate_round_trip() {
        let (portfolio, _dir) = portfolio(InvestedAmountPolicy::Retain).await;

        portfolio
            .create_transaction(buy("OGDC", date(2024, 1, 2), 300, dec!(120.40)))
            .await
            .unwrap();
        let second = buy("OGDC", date(2024, 1, 15), 200, dec!(118.05));
        let second_id = *portfolio
            .create_transaction(second.clone())
            .await
            .unwrap()
            .id();
        portfolio
            .create_transaction(sell("OGDC", date(2024, 2, 20), 400, dec!(131.75)))
            .await
            .unwrap();

        let holding = portfolio.get_holding("OGDC").await.unwrap();
        let pnl = portfolio
            .list_realized_pnl(RealizedPnlFilter::default())
            .await
            .unwrap();

        portfolio.delete_transaction(second_id).await.unwrap_err();

        // Remove the sale first so the buy can go, then put both back.
        let sale_id = *pnl[0].transaction_id();
        portfolio.delete_transaction(sale_id).await.unwrap();
        portfolio.delete_transaction(second_id).await.unwrap();
        portfolio.create_transaction(second).await.unwrap();
        portfolio
            .create_transaction(sell("OGDC", date(2024, 2, 20), 400, dec!(131.75)))
            .await
            .unwrap();

        assert_eq!(portfolio.get_holding("OGDC").await.unwrap(), holding);
        let recreated = portfolio
            .list_realized_pnl(RealizedPnlFilter::default())
            .await
            .unwrap();
        assert_eq!(recreated.len(), 1);
        assert_eq!(recreated[0].realized_pnl(), pnl[0].realized_pnl());
        assert_eq!(recreated[0].cost_basis(), pnl[0].cost_basis());
    }

    #[tokio::test]
    async fn rebuild_is_idempotent() {
        let (portfolio, _dir) = portfolio(InvestedAmountPolicy::Proportional).await;

        portfolio
            .create_transaction(buy("HUBC", date(2024, 1, 2), 500, dec!(110.25)))
            .await
            .unwrap();
        portfolio
            .create_transaction(buy("HUBC", date(2024, 1, 20), 250, dec!(98.60)))
            .await
            .unwrap();
        portfolio
            .create_transaction(sell("HUBC", date(2024, 3, 4), 600, dec!(121.10)))
            .await
            .unwrap();

        let holding = portfolio.get_holding("HUBC").await.unwrap();
        let pnl = |records: Vec<RealizedPnl>| {
            records
                .into_iter()
                .map(|r| (*r.transaction_id(), *r.realized_pnl(), *r.cost_basis()))
                .collect::<Vec<_>>()
        };
        let before = pnl(portfolio
            .list_realized_pnl(RealizedPnlFilter::default())
            .await
            .unwrap());

        let first = portfolio.rebuild("hubc").await.unwrap();
        let second = portfolio.rebuild("HUBC").await.unwrap();

        assert_eq!(first.holding().as_ref(), Some(&holding));
        assert_eq!(second.holding(), first.holding());
        assert_eq!(portfolio.get_holding("HUBC").await.unwrap(), holding);
        assert_eq!(
            pnl(portfolio
                .list_realized_pnl(RealizedPnlFilter::default())
                .await
                .unwrap()),
            before
        );
        assert_eq!(portfolio.rebuild_all().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn back_dated_entries_replay_the_symbol() {
        let (portfolio, _dir) = portfolio(InvestedAmountPolicy::Retain).await;

        portfolio
            .create_transaction(buy("TRG", date(2024, 3, 1), 100, dec!(70)))
            .await
            .unwrap();

        let err = portfolio
            .create_transaction(sell("TRG", date(2024, 2, 1), 50, dec!(75)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PortfolioError::InsufficientQuantity { available: 0, requested: 50, .. }
        ));

        portfolio
            .create_transaction(sell("TRG", date(2024, 4, 1), 100, dec!(75)))
            .await
            .unwrap();
        portfolio
            .create_transaction(buy("TRG", date(2024, 1, 5), 100, dec!(60)))
            .await
            .unwrap();

        let holding = portfolio.get_holding("TRG").await.unwrap();
        assert_eq!(*holding.available_quantity(), 100);
        assert_eq!(*holding.total_shares_bought(), 200);
        // The April sale now runs against the blended average.
        let realized = portfolio
            .list_realized_pnl(RealizedPnlFilter::default())
            .await
            .unwrap();
        assert_eq!(realized.len(), 1);
        assert_eq!(realized[0].avg_cost_basis(), holding.avg_cost_per_share());

        // Selling 150 on 2 March leaves the April sale short.
        let err = portfolio
            .create_transaction(sell("TRG", date(2024, 3, 2), 150, dec!(75)))
            .await
            .unwrap_err();
        assert!(matches!(err, PortfolioError::Consistency { .. }), "{err}");
        let page = portfolio
            .list_transactions(TransactionFilter::for_symbol("TRG"))
            .await
            .unwrap();
        assert_eq!(*page.total(), 3);
    }

    #[tokio::test]
    async fn editing_a_trade_replays_affected_symbols() {
        let (portfolio, _dir) = portfolio(InvestedAmountPolicy::Retain).await;

        let bought = portfolio
            .create_transaction(buy("TRG", date(2024, 1, 10), 100, dec!(85.50)))
            .await
            .unwrap();
        portfolio
            .create_transaction(sell("TRG", date(2024, 2, 1), 50, dec!(92)))
            .await
            .unwrap();

        let edited = portfolio
            .update_transaction(*bought.id(), buy("TRG", date(2024, 1, 10), 200, dec!(85.50)))
            .await
            .unwrap();
        assert_eq!(*edited.quantity(), 200);
        assert_eq!(*edited.charges().total(), dec!(30.50));
        assert_eq!(edited.created_at(), bought.created_at());

        let holding = portfolio.get_holding("TRG").await.unwrap();
        assert_eq!(*holding.available_quantity(), 150);

        // Moving the buy away from its sale breaks TRG's history.
        let err = portfolio
            .update_transaction(*bought.id(), buy("OGDC", date(2024, 1, 10), 200, dec!(85.50)))
            .await
            .unwrap_err();
        assert!(matches!(err, PortfolioError::Consistency { .. }));
        assert_eq!(
            portfolio.get_transaction(*bought.id()).await.unwrap().symbol(),
            "TRG"
        );

        let lone = portfolio
            .create_transaction(buy("PSO", date(2024, 1, 3), 10, dec!(150)))
            .await
            .unwrap();
        portfolio
            .update_transaction(*lone.id(), buy("OGDC", date(2024, 1, 3), 10, dec!(150)))
            .await
            .unwrap();
        assert!(matches!(
            portfolio.get_holding("PSO").await,
            Err(PortfolioError::NotFound(_))
        ));
        assert_eq!(
            *portfolio.get_holding("OGDC").await.unwrap().available_quantity(),
            10
        );
    }

    #[tokio::test]
    async fn transaction_filters_and_pagination() {
        let (portfolio, _dir) = portfolio(InvestedAmountPolicy::Retain).await;

        for (symbol, day) in [("TRG", 2), ("TRG", 3), ("OGDC", 4), ("TRG", 5), ("OGDC", 6)] {
            portfolio
                .create_transaction(buy(symbol, date(2024, 1, day), 10, dec!(50)))
                .await
                .unwrap();
        }
        portfolio
            .create_transaction(sell("TRG", date(2024, 1, 8), 5, dec!(55)))
            .await
            .unwrap();

        let trg = portfolio
            .list_transactions(TransactionFilter::for_symbol("trg"))
            .await
            .unwrap();
        assert_eq!(*trg.total(), 4);
        assert_eq!(trg.data()[0].date(), &date(2024, 1, 8));

        let sells = portfolio
            .list_transactions(TransactionFilter {
                side: Some(TradeSide::Sell),
                ..TransactionFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(*sells.total(), 1);

        let ranged = portfolio
            .list_transactions(TransactionFilter {
                date_from: Some(date(2024, 1, 3)),
                date_to: Some(date(2024, 1, 5)),
                ..TransactionFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(*ranged.total(), 3);

        let second_page = portfolio
            .list_transactions(TransactionFilter {
                page: 2,
                limit: 4,
                ..TransactionFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(*second_page.total(), 6);
        assert_eq!(*second_page.pages(), 2);
        assert_eq!(second_page.data().len(), 2);
        assert_eq!(second_page.data()[1].date(), &date(2024, 1, 2));

        for filter in [
            TransactionFilter {
                limit: 0,
                ..TransactionFilter::default()
            },
            TransactionFilter {
                limit: 501,
                ..TransactionFilter::default()
            },
            TransactionFilter {
                page: 0,
                ..TransactionFilter::default()
            },
            TransactionFilter {
                date_from: Some(date(2024, 2, 1)),
                date_to: Some(date(2024, 1, 1)),
                ..TransactionFilter::default()
            },
        ] {
            assert!(matches!(
                portfolio.list_transactions(filter).await,
                Err(PortfolioError::Validation(_))
            ));
        }
    }

    #[tokio::test]
    async fn summary_and_reports() {
        let (portfolio, _dir) = portfolio(InvestedAmountPolicy::Retain).await;

        portfolio
            .create_transaction(buy("TRG", date(2023, 12, 1), 100, dec!(85.50)))
            .await
            .unwrap();
        let sold = portfolio
            .create_transaction(sell("TRG", date(2024, 1, 15), 100, dec!(92)))
            .await
            .unwrap();
        portfolio
            .create_transaction(buy("OGDC", date(2024, 2, 1), 50, dec!(120)))
            .await
            .unwrap();

        let summary = portfolio.get_portfolio_summary().await.unwrap();
        assert_eq!(summary.holdings().len(), 2);
        assert_eq!(*summary.active_symbol_count(), 1);
        assert_eq!(*summary.total_shares_held(), 50);
        assert_eq!(summary.total_recovered(), sold.net_amount());

        let monthly = portfolio.monthly_pnl(Some(2024)).await.unwrap();
        assert_eq!(monthly.len(), 1);
        assert_eq!(*monthly[0].month(), 1);

        let yearly = portfolio.yearly_pnl().await.unwrap();
        assert_eq!(
            yearly.iter().map(|y| *y.year()).collect::<Vec<_>>(),
            vec![2024, 2023]
        );
        assert_eq!(*yearly[1].sale_count(), 0);
        assert!(*yearly[1].total_charges() > Decimal::ZERO);

        let scripts = portfolio.script_wise_pnl().await.unwrap();
        assert_eq!(scripts.len(), 2);

        let details = portfolio.script_details("trg").await.unwrap();
        assert_eq!(details.transactions()[0].id(), sold.id());
        assert_eq!(details.realized().len(), 1);
        assert!(matches!(
            portfolio.script_details("MEBL").await,
            Err(PortfolioError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn realized_pnl_filters() {
        let (portfolio, _dir) = portfolio(InvestedAmountPolicy::Retain).await;

        portfolio
            .create_transaction(buy("TRG", date(2024, 1, 2), 100, dec!(85.50)))
            .await
            .unwrap();
        portfolio
            .create_transaction(buy("OGDC", date(2024, 1, 2), 100, dec!(120)))
            .await
            .unwrap();
        portfolio
            .create_transaction(sell("TRG", date(2024, 2, 1), 50, dec!(92)))
            .await
            .unwrap();
        portfolio
            .create_transaction(sell("TRG", date(2024, 3, 1), 50, dec!(90)))
            .await
            .unwrap();
        portfolio
            .create_transaction(sell("OGDC", date(2024, 3, 5), 10, dec!(118)))
            .await
            .unwrap();

        let all = portfolio
            .list_realized_pnl(RealizedPnlFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].symbol(), "OGDC");

        let trg_march = portfolio
            .list_realized_pnl(RealizedPnlFilter {
                symbol: Some("trg".to_string()),
                date_from: Some(date(2024, 3, 1)),
                date_to: None,
            })
            .await
            .unwrap();
        assert_eq!(trg_march.len(), 1);
        assert_eq!(trg_march[0].sell_date(), &date(2024, 3, 1));
    }

    #[tokio::test]
    async fn proportional_policy_through_the_store() {
        let (portfolio, _dir) = portfolio(InvestedAmountPolicy::Proportional).await;

        portfolio
            .create_transaction(buy("TRG", date(2024, 1, 10), 100, dec!(85.50)))
            .await
            .unwrap();
        portfolio
            .create_transaction(sell("TRG", date(2024, 2, 1), 50, dec!(92)))
            .await
            .unwrap();
        assert_eq!(
            *portfolio.get_holding("TRG").await.unwrap().total_invested_amount(),
            dec!(4282.625)
        );

        portfolio
            .create_transaction(sell("TRG", date(2024, 2, 2), 50, dec!(92)))
            .await
            .unwrap();
        let holding = portfolio.get_holding("TRG").await.unwrap();
        assert_eq!(*holding.total_invested_amount(), Decimal::ZERO);
        assert_eq!(*holding.available_quantity(), 0);
    }

    #[tokio::test]
    async fn csv_import() {
        let (portfolio, dir) = portfolio(InvestedAmountPolicy::Retain).await;

        let path = dir.path().join("trades.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "date,side,symbol,quantity,rate").unwrap();
        writeln!(file, "2024-01-10,BUY,trg,100,85.50").unwrap();
        writeln!(file, "2024-01-12,DIVIDEND,TRG,100,1.25").unwrap();
        writeln!(file, "2024-02-01,sell,TRG,50,92").unwrap();
        drop(file);

        let imported = portfolio.import_transactions(&path).await.unwrap();
        assert_eq!(imported.len(), 2);
        assert_eq!(
            *portfolio.get_holding("TRG").await.unwrap().available_quantity(),
            50
        );

        let broken = dir.path().join("broken.csv");
        std::fs::write(&broken, "date,side,symbol,quantity,rate\n2024-01-10,BUY,TRG,ten,85\n")
            .unwrap();
        assert!(matches!(
            portfolio.import_transactions(&broken).await,
            Err(PortfolioError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn custom_charge_schedule_is_frozen_on_the_trade() {
        let (portfolio, _dir) = portfolio(InvestedAmountPolicy::Retain).await;
        let portfolio = portfolio.with_charge_schedule(ChargeSchedule {
            depository_fee_per_share: Decimal::ZERO,
            ..ChargeSchedule::default()
        });
        assert_eq!(portfolio.ledger().policy(), InvestedAmountPolicy::Retain);

        let bought = portfolio
            .create_transaction(buy("TRG", date(2024, 1, 10), 100, dec!(85.50)))
            .await
            .unwrap();
        assert_eq!(*bought.charges().depository_fee(), Decimal::ZERO);
        assert_eq!(*bought.charges().total(), dec!(14.75));
        assert_eq!(
            portfolio.charge_schedule().depository_fee_per_share,
            Decimal::ZERO
        );
    }

    #[tokio::test]
    async fn preview_prices_without_booking() {
        let (portfolio, _dir) = portfolio(InvestedAmountPolicy::Retain).await;

        let preview = portfolio
            .preview_transaction(buy("trg", date(2024, 1, 10), 100, dec!(85.50)))
            .unwrap();
        assert_eq!(preview.symbol(), "TRG");
        assert_eq!(*preview.amount(), dec!(8550.00));
        assert_eq!(*preview.charges().total(), dec!(15.25));
        assert_eq!(*preview.net_amount(), dec!(8565.25));

        let preview = portfolio
            .preview_transaction(sell("TRG", date(2024, 2, 1), 50, dec!(92.00)))
            .unwrap();
        assert_eq!(*preview.net_amount(), dec!(4591.81));

        assert!(matches!(
            portfolio.preview_transaction(buy("TRG", date(2024, 1, 10), 0, dec!(85))),
            Err(PortfolioError::Validation(_))
        ));
        assert!(portfolio.get_holdings().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_sells_cannot_both_spend_the_same_shares() {
        let (portfolio, _dir) = portfolio(InvestedAmountPolicy::Retain).await;
        let portfolio = Arc::new(portfolio);
        portfolio
            .create_transaction(buy("TRG", date(2024, 1, 10), 100, dec!(85.50)))
            .await
            .unwrap();

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let portfolio = Arc::clone(&portfolio);
                tokio::spawn(async move {
                    portfolio
                        .create_transaction(sell("TRG", date(2024, 2, 1), 60, dec!(92)))
                        .await
                })
            })
            .collect();

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.iter().any(|r| matches!(
            r,
            Err(PortfolioError::InsufficientQuantity {
                available: 40,
                requested: 60,
                ..
            })
        )));

        let holding = portfolio.get_holding("TRG").await.unwrap();
        assert_eq!(*holding.available_quantity(), 40);
        assert_eq!(*holding.total_shares_sold(), 60);
        let realized = portfolio
            .list_realized_pnl(RealizedPnlFilter::default())
            .await
            .unwrap();
        assert_eq!(realized.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writes_to_different_symbols_all_land() {
        let (portfolio, _dir) = portfolio(InvestedAmountPolicy::Retain).await;
        let portfolio = Arc::new(portfolio);

        for round in 0..3 {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let portfolio = Arc::clone(&portfolio);
                    tokio::spawn(async move {
                        portfolio
                            .create_transaction(buy(
                                &format!("S{i}"),
                                date(2024, 1, 2 + round),
                                100,
                                dec!(50),
                            ))
                            .await
                    })
                })
                .collect();

            for handle in handles {
                handle.await.unwrap().unwrap();
            }
        }

        let holdings = portfolio.get_holdings().await.unwrap();
        assert_eq!(holdings.len(), 8);
        assert!(holdings.iter().all(|h| *h.available_quantity() == 300));
    }
}
