//! Analysis catalog: every dashboard section, its overview query and its
//! topics, as plain data. Pages look entries up here instead of branching.

use crate::charts::{ChartKind, ChartSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    CustomerOrders,
    RevenueProfit,
    DeliveryPerformance,
    RestaurantPerformance,
    OperationalInsights,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::CustomerOrders,
        Section::RevenueProfit,
        Section::DeliveryPerformance,
        Section::RestaurantPerformance,
        Section::OperationalInsights,
    ];

    pub fn definition(&self) -> &'static SectionDef {
        match self {
            Section::CustomerOrders => &CUSTOMER_ORDERS,
            Section::RevenueProfit => &REVENUE_PROFIT,
            Section::DeliveryPerformance => &DELIVERY_PERFORMANCE,
            Section::RestaurantPerformance => &RESTAURANT_PERFORMANCE,
            Section::OperationalInsights => &OPERATIONAL_INSIGHTS,
        }
    }

    pub fn title(&self) -> &'static str {
        self.definition().title
    }

    pub fn topic(&self, key: &str) -> Option<&'static Topic> {
        self.definition().topics.iter().find(|t| t.key == key)
    }
}

/// One selectable analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Topic {
    pub key: &'static str,
    pub label: &'static str,
    pub sql: &'static str,
    pub charts: &'static [ChartSpec],
    pub insight: &'static str,
}

/// A dashboard page: shown with its overview table until a topic is picked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionDef {
    pub title: &'static str,
    pub icon: &'static str,
    pub overview_sql: &'static str,
    pub topics: &'static [Topic],
}

pub static CUSTOMER_ORDERS: SectionDef = SectionDef {
    title: "Customer & Order Analysis",
    icon: "👤",
    overview_sql: "SELECT order_id, customer_id, customer_age, customer_gender, city, area, order_date,
        order_value, discount_applied, final_amount, order_day_name
        FROM food_order_details",
    topics: &[
        Topic {
            key: "top_spending_customers",
            label: "Top-spending customers",
            sql: "SELECT customer_id, SUM(order_value) AS total_spent
                FROM food_order_details
                GROUP BY customer_id
                ORDER BY total_spent DESC
                LIMIT 10",
            charts: &[ChartSpec::new(
                ChartKind::Histogram,
                "Customer vs Total Spent",
                "customer_id",
                "total_spent",
            )],
            insight: "A single customer leads total spend, driven by frequent orders with high order values.",
        },
        Topic {
            key: "age_group_order_value",
            label: "Age Group vs Order value",
            sql: "SELECT customer_age_group,
                COUNT(*) AS total_orders,
                SUM(order_value) AS total_revenue,
                SUM(final_amount) AS total_order_value
                FROM food_order_details
                GROUP BY customer_age_group
                ORDER BY total_order_value DESC",
            charts: &[
                ChartSpec::new(
                    ChartKind::Bar,
                    "Customer Age Group vs Total Order Value",
                    "customer_age_group",
                    "total_order_value",
                ),
                ChartSpec::new(
                    ChartKind::Pie,
                    "Customer Age Group vs Total Orders",
                    "customer_age_group",
                    "total_orders",
                ),
            ],
            insight: "Adults lead both order count and order value, contributing more volume and revenue than the Youth segment.",
        },
        Topic {
            key: "weekend_vs_weekday",
            label: "Weekend vs Weekday Order patterns",
            sql: "SELECT order_day, order_day_name,
                COUNT(*) AS total_orders,
                SUM(order_value) AS total_revenue,
                AVG(order_value) AS avg_order_value
                FROM food_order_details
                GROUP BY order_day, order_day_name",
            charts: &[
                ChartSpec::new(
                    ChartKind::Histogram,
                    "Order Week vs Total Orders",
                    "order_day",
                    "total_orders",
                ),
                ChartSpec::new(
                    ChartKind::Pie,
                    "Order Day vs Total Revenue",
                    "order_day_name",
                    "total_revenue",
                ),
            ],
            insight: "Weekdays carry clearly more orders than weekends, so most revenue is earned on weekdays.",
        },
    ],
};

pub static REVENUE_PROFIT: SectionDef = SectionDef {
    title: "Revenue & Profit Analysis",
    icon: "💸",
    overview_sql: "SELECT order_id, city, cuisine_type, order_date, order_value, discount_applied,
        final_amount, payment_mode, profit_margin, profit_margin_percent
        FROM food_order_details",
    topics: &[
        Topic {
            key: "monthly_revenue",
            label: "Monthly revenue trends",
            sql: "SELECT CAST(strftime('%m', order_date) AS INTEGER) AS month,
                COUNT(*) AS total_orders,
                SUM(final_amount) AS total_revenue,
                ROUND(AVG(final_amount), 2) AS avg_order_value
                FROM food_order_details
                GROUP BY month
                ORDER BY month ASC",
            charts: &[ChartSpec::new(
                ChartKind::Area,
                "Month vs Total Revenue",
                "month",
                "total_revenue",
            )],
            insight: "July shows the highest order volume and the highest revenue of all months.",
        },
        Topic {
            key: "discount_impact",
            label: "Impact of discounts on profit",
            sql: "SELECT discount_applied,
                COUNT(*) AS total_orders,
                SUM(final_amount) AS total_revenue,
                AVG(order_value) AS avg_order_value,
                AVG(profit_margin) AS avg_profit_margin,
                AVG(profit_margin_percent) AS avg_profit_margin_percent
                FROM food_order_details
                GROUP BY discount_applied
                ORDER BY discount_applied ASC",
            charts: &[ChartSpec::new(
                ChartKind::Line,
                "Discount vs Avg Profit Percent",
                "discount_applied",
                "avg_profit_margin_percent",
            )],
            insight: "Profit margin stays roughly flat across discount levels; discounts do not move overall profitability much.",
        },
        Topic {
            key: "city_cuisine_revenue",
            label: "High-revenue cities and cuisines",
            sql: "SELECT city, cuisine_type, SUM(final_amount) AS total_revenue
                FROM food_order_details
                GROUP BY city, cuisine_type
                ORDER BY total_revenue DESC",
            charts: &[
                ChartSpec::new(
                    ChartKind::Histogram,
                    "City vs Total Revenue",
                    "city",
                    "total_revenue",
                ),
                ChartSpec::new(
                    ChartKind::Pie,
                    "Cuisine vs Total Revenue",
                    "cuisine_type",
                    "total_revenue",
                ),
            ],
            insight: "Hyderabad accounts for the largest share of orders, and Indian cuisine is its leading revenue contributor.",
        },
    ],
};

pub static DELIVERY_PERFORMANCE: SectionDef = SectionDef {
    title: "Delivery Performance",
    icon: "🛵",
    overview_sql: "SELECT order_id, city, final_amount, order_time, delivery_time_min, distance_km,
        delivery_partner_id, delivery_rating, delivery_performance
        FROM food_order_details",
    topics: &[
        Topic {
            key: "delivery_time_by_city",
            label: "Average delivery time by city",
            sql: "SELECT city, AVG(delivery_time_min) AS avg_delivery_time
                FROM food_order_details
                GROUP BY city
                ORDER BY avg_delivery_time DESC",
            charts: &[ChartSpec::new(
                ChartKind::HorizontalBar,
                "City vs Delivery Time",
                "city",
                "avg_delivery_time",
            )],
            insight: "Average delivery time is nearly uniform across cities.",
        },
        Topic {
            key: "distance_vs_delay",
            label: "Distance vs delivery delay analysis",
            sql: "SELECT
                CASE
                    WHEN distance_km <= 5 THEN '0-5 km'
                    WHEN distance_km <= 10 THEN '5-10 km'
                    WHEN distance_km <= 15 THEN '10-15 km'
                    WHEN distance_km <= 20 THEN '15-20 km'
                    WHEN distance_km <= 30 THEN '20-30 km'
                    ELSE '30+ km'
                END AS distance_range,
                COUNT(*) AS total_orders,
                AVG(delivery_time_min) AS avg_delivery_time
                FROM food_order_details
                GROUP BY distance_range
                ORDER BY avg_delivery_time",
            charts: &[ChartSpec::new(
                ChartKind::Bar,
                "Distance Range vs Delivery Time",
                "distance_range",
                "avg_delivery_time",
            )],
            insight: "Delivery time barely grows with distance; short and 30+ km orders take comparable time.",
        },
        Topic {
            key: "rating_vs_delivery_time",
            label: "Delivery rating vs delivery time",
            sql: "SELECT delivery_rating,
                COUNT(*) AS total_orders,
                AVG(delivery_time_min) AS avg_delivery_time
                FROM food_order_details
                GROUP BY delivery_rating
                ORDER BY delivery_rating ASC",
            charts: &[ChartSpec::new(
                ChartKind::Area,
                "Delivery Rating vs Delivery Time",
                "delivery_rating",
                "avg_delivery_time",
            )],
            insight: "Delivery time hardly varies across rating levels, so speed alone does not explain ratings.",
        },
    ],
};

pub static RESTAURANT_PERFORMANCE: SectionDef = SectionDef {
    title: "Restaurant Performance",
    icon: "🍽",
    overview_sql: "SELECT order_id, restaurant_id, restaurant_name, city, cuisine_type, order_date,
        restaurant_rating, final_amount, cancellation_reason, profit_margin, profit_margin_percent
        FROM food_order_details",
    topics: &[
        Topic {
            key: "top_rated_restaurants",
            label: "Top-rated restaurants",
            sql: "SELECT restaurant_name,
                COUNT(*) AS total_orders,
                AVG(restaurant_rating) AS avg_rating
                FROM food_order_details
                GROUP BY restaurant_name
                ORDER BY avg_rating DESC",
            charts: &[
                ChartSpec::new(
                    ChartKind::Bar,
                    "Restaurant Name vs Avg Rating",
                    "restaurant_name",
                    "avg_rating",
                )
                .with_limit(10),
                ChartSpec::new(
                    ChartKind::Donut,
                    "Top Restaurants by Orders",
                    "restaurant_name",
                    "total_orders",
                )
                .with_limit(10),
            ],
            insight: "Customer ratings are consistent across restaurants with no significant outlier.",
        },
        Topic {
            key: "cancellation_rate",
            label: "Cancellation rate by restaurant",
            sql: "SELECT restaurant_name,
                COUNT(*) AS total_orders,
                SUM(CASE WHEN order_status = 'Cancelled' THEN 1 ELSE 0 END) AS cancelled_orders,
                ROUND(SUM(CASE WHEN order_status = 'Cancelled' THEN 1 ELSE 0 END) * 100.0 / COUNT(*), 2)
                    AS cancellation_percent
                FROM food_order_details
                GROUP BY restaurant_name
                ORDER BY cancellation_percent DESC",
            charts: &[ChartSpec::new(
                ChartKind::Bar,
                "Restaurant Name vs Cancelled Orders",
                "restaurant_name",
                "cancellation_percent",
            )
            .with_limit(10)],
            insight: "Cancellations occur at most restaurants; the worst one cancels roughly a fifth of its orders.",
        },
        Topic {
            key: "cuisine_performance",
            label: "Cuisine-wise performance",
            sql: "SELECT cuisine_type,
                COUNT(*) AS total_orders,
                SUM(final_amount) AS total_revenue,
                AVG(final_amount) AS avg_order_value,
                AVG(profit_margin) AS avg_profit,
                AVG(profit_margin_percent) AS avg_profit_percent
                FROM food_order_details
                GROUP BY cuisine_type
                ORDER BY avg_profit_percent DESC",
            charts: &[
                ChartSpec::new(
                    ChartKind::Bar,
                    "Cuisine Type vs Profit Percent",
                    "cuisine_type",
                    "avg_profit_percent",
                ),
                ChartSpec::new(
                    ChartKind::Donut,
                    "Cuisine Type vs Total Orders",
                    "cuisine_type",
                    "total_orders",
                ),
            ],
            insight: "Indian food leads in order volume while Italian cuisine earns the highest profit margin.",
        },
    ],
};

pub static OPERATIONAL_INSIGHTS: SectionDef = SectionDef {
    title: "Operational Insights",
    icon: "🛠",
    overview_sql: "SELECT order_id, order_date, final_amount, peak_hour, peak_hour_indicator,
        payment_mode, cancellation_reason
        FROM food_order_details",
    topics: &[
        Topic {
            key: "peak_hour_demand",
            label: "Peak hour demand analysis",
            sql: "SELECT peak_hour_indicator,
                COUNT(*) AS total_orders,
                SUM(final_amount) AS total_revenue,
                AVG(final_amount) AS avg_order_value
                FROM food_order_details
                GROUP BY peak_hour_indicator
                ORDER BY total_orders DESC",
            charts: &[
                ChartSpec::new(
                    ChartKind::Bar,
                    "Peak Hour vs Total Orders",
                    "peak_hour_indicator",
                    "total_orders",
                ),
                ChartSpec::new(
                    ChartKind::Bar,
                    "Peak Hour vs Total Revenue",
                    "peak_hour_indicator",
                    "total_revenue",
                ),
            ],
            insight: "Peak hours drive most orders and revenue.",
        },
        Topic {
            key: "payment_modes",
            label: "Payment mode preferences",
            sql: "SELECT payment_mode,
                COUNT(*) AS total_orders,
                ROUND(SUM(final_amount), 2) AS revenue_amount
                FROM food_order_details
                GROUP BY payment_mode
                ORDER BY revenue_amount DESC",
            charts: &[
                ChartSpec::new(
                    ChartKind::Pie,
                    "Payment Mode vs Total Orders",
                    "payment_mode",
                    "total_orders",
                ),
                ChartSpec::new(
                    ChartKind::Donut,
                    "Payment Mode vs Revenue Amount",
                    "payment_mode",
                    "revenue_amount",
                ),
            ],
            insight: "UPI is widely available, yet most customers prefer paying by card.",
        },
        Topic {
            key: "cancellation_reasons",
            label: "Cancellation reason analysis",
            sql: "SELECT city, cancellation_reason, COUNT(*) AS count
                FROM food_order_details
                WHERE cancellation_reason != 'No Cancellation'
                GROUP BY cancellation_reason, city
                ORDER BY count DESC",
            charts: &[ChartSpec::new(
                ChartKind::Sunburst,
                "Cancellation Reason Analysis by City",
                "cancellation_reason",
                "count",
            )
            .with_parent("city")],
            insight: "The busiest city also has the largest share of cancellations, pointing at strain in high-demand areas.",
        },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartSeries;
    use crate::data::{DataCleaner, RawOrder};
    use crate::store::OrderStore;
    use std::collections::HashSet;

    fn populated_store() -> OrderStore {
        let cities = ["Pune", "Delhi", "Hyderabad"];
        let cuisines = ["Indian", "Italian", "Chinese"];
        let rows = (0..24)
            .map(|i| RawOrder {
                order_id: Some(format!("ORD{i:03}")),
                customer_id: Some(format!("C{}", i % 7)),
                customer_age: Some(18.0 + (i * 3) as f64),
                customer_gender: Some(if i % 2 == 0 { "Male" } else { "Female" }.into()),
                city: Some(cities[i % 3].into()),
                area: Some("Central".into()),
                restaurant_name: Some(format!("Restaurant {}", i % 5)),
                cuisine_type: Some(cuisines[i % 3].into()),
                order_date: Some(format!("2023-{:02}-{:02}", 1 + i % 12, 1 + i % 28)),
                order_time: Some(format!("{:02}:15:00", 8 + i % 12)),
                delivery_time_min: Some(20.0 + i as f64),
                distance_km: Some(1.5 * i as f64),
                order_value: Some(200.0 + 25.0 * i as f64),
                discount_applied: Some((i % 4) as f64 * 10.0),
                payment_mode: Some(if i % 3 == 0 { "UPI" } else { "Card" }.into()),
                order_status: Some(if i % 4 == 0 { "Cancelled" } else { "Delivered" }.into()),
                cancellation_reason: (i % 4 == 0).then(|| "Late Delivery".to_string()),
                delivery_rating: Some((1 + i % 5) as f64),
                restaurant_rating: Some(3.0 + (i % 3) as f64 * 0.5),
                peak_hour: Some((i % 2 == 0).to_string()),
                profit_margin: Some(0.1 + (i % 3) as f64 * 0.05),
                ..RawOrder::default()
            })
            .collect();
        let records = DataCleaner::default().clean(rows).unwrap().records;
        let mut store = OrderStore::open_in_memory().unwrap();
        store.append(&records).unwrap();
        store
    }

    #[test]
    fn every_query_runs_and_feeds_its_charts() {
        let store = populated_store();
        for section in Section::ALL {
            let def = section.definition();
            let overview = store.query(def.overview_sql).unwrap();
            assert_eq!(overview.len(), 24, "{}", def.title);

            for topic in def.topics {
                let table = store.query(topic.sql).unwrap();
                assert!(!table.is_empty(), "{}", topic.key);
                for chart in topic.charts {
                    for column in chart.required_columns() {
                        assert!(
                            table.column_index(column).is_some(),
                            "{}: missing {column}",
                            topic.key
                        );
                    }
                    let series = ChartSeries::from_table(&table, chart).unwrap();
                    assert!(!series.is_empty(), "{}: {}", topic.key, chart.title);
                }
            }
        }
    }

    #[test]
    fn distance_buckets_and_cancellation_filter() {
        let store = populated_store();
        let table = store
            .query(Section::DeliveryPerformance.topic("distance_vs_delay").unwrap().sql)
            .unwrap();
        let buckets: HashSet<String> = (0..table.len()).map(|r| table.text(r, 0)).collect();
        let expected: HashSet<String> = ["0-5 km", "5-10 km", "10-15 km", "15-20 km", "20-30 km", "30+ km"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(buckets, expected);

        let reasons = store
            .query(Section::OperationalInsights.topic("cancellation_reasons").unwrap().sql)
            .unwrap();
        let idx = reasons.column_index("cancellation_reason").unwrap();
        assert!((0..reasons.len()).all(|r| reasons.text(r, idx) != "No Cancellation"));
    }

    #[test]
    fn every_section_has_three_uniquely_keyed_topics() {
        for section in Section::ALL {
            let def = section.definition();
            assert_eq!(def.topics.len(), 3, "{}", def.title);
            let keys: HashSet<&str> = def.topics.iter().map(|t| t.key).collect();
            assert_eq!(keys.len(), 3);
            for topic in def.topics {
                assert!(!topic.charts.is_empty(), "{}", topic.key);
                assert!(!topic.insight.is_empty());
                assert_eq!(section.topic(topic.key), Some(topic));
            }
        }
        assert_eq!(Section::CustomerOrders.topic("nope"), None);
    }

    #[test]
    fn sunburst_charts_name_a_parent() {
        for section in Section::ALL {
            for topic in section.definition().topics {
                for chart in topic.charts {
                    if chart.kind == ChartKind::Sunburst {
                        assert!(chart.parent.is_some(), "{}", topic.key);
                    }
                }
            }
        }
    }
}
