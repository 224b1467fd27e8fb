//! Transaction profiles executed through a proxy server.

use chrono::NaiveDate;
use std::thread;
use tpcc_backend::{Backend, SqlConnection};
use tpcc_sqlite::{fixture, SqliteConfig};
use tpcc_sqlite_proxy::server::MEMORY_DATABASE;
use tpcc_sqlite_proxy::{connect, ProxyBackend, ProxyConfig, ProxyServer};
use tpcc_types::{
    CustomerSelector, DeliveryParams, NewOrderLine, NewOrderParams, PaymentParams,
    ScaleParameters, SqlValue, StockLevelParams, TransactionParams, TransactionResult,
};

fn setup() -> (tempfile::TempDir, ProxyBackend) {
    let dir = tempfile::tempdir().unwrap();
    let scale = ScaleParameters::new(50, 2, 1, 10, 30, 9).unwrap();
    let template = fixture::create_partitions(dir.path(), &scale).unwrap();

    let server =
        ProxyServer::bind("127.0.0.1:0", MEMORY_DATABASE, SqliteConfig::default()).unwrap();
    let addr = server.local_addr().unwrap();
    thread::spawn(move || server.serve());

    let config = ProxyConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        database: template,
    };
    let backend = connect(&config, scale.districts_per_warehouse).unwrap();
    (dir, backend)
}

#[test]
fn test_new_order_through_proxy() {
    let (_dir, mut backend) = setup();
    let params = NewOrderParams {
        w_id: 1,
        d_id: 2,
        c_id: 3,
        o_entry_d: NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
        lines: vec![NewOrderLine {
            i_id: 5,
            supply_w_id: 2,
            quantity: 4,
        }],
    };
    let result = match backend.execute(&TransactionParams::NewOrder(params)).unwrap() {
        TransactionResult::NewOrder(Some(result)) => result,
        other => panic!("unexpected result {other:?}"),
    };
    assert_eq!(result.o_id, 31);
    assert_eq!(backend.attached().len(), 2);

    let rows = backend
        .connection()
        .execute(
            "SELECT S_REMOTE_CNT FROM P2.STOCK WHERE S_W_ID = 2 AND S_I_ID = 5",
            &[],
        )
        .unwrap();
    backend.connection().commit().unwrap();
    assert_eq!(rows[0][0], SqlValue::Integer(1));
}

#[test]
fn test_payment_and_delivery_through_proxy() {
    let (_dir, mut backend) = setup();
    let payment = PaymentParams {
        w_id: 2,
        d_id: 1,
        h_amount: 25.0,
        c_w_id: 2,
        c_d_id: 1,
        customer: CustomerSelector::ById(1),
        h_date: NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
    };
    let h_date = payment.h_date;
    match backend.execute(&TransactionParams::Payment(payment)).unwrap() {
        TransactionResult::Payment(result) => {
            assert_eq!(result.customer[0], SqlValue::Integer(1))
        }
        other => panic!("unexpected result {other:?}"),
    }

    let delivery = DeliveryParams {
        w_id: 2,
        o_carrier_id: 7,
        ol_delivery_d: h_date,
    };
    match backend.execute(&TransactionParams::Delivery(delivery)).unwrap() {
        TransactionResult::Delivery(result) => assert_eq!(result.delivered.len(), 10),
        other => panic!("unexpected result {other:?}"),
    }

    let low = backend
        .execute(&TransactionParams::StockLevel(StockLevelParams {
            w_id: 2,
            d_id: 1,
            threshold: 20,
        }))
        .unwrap();
    assert!(matches!(low, TransactionResult::StockLevel(n) if n >= 0));
    assert_eq!(backend.attached().len(), 1);
}
