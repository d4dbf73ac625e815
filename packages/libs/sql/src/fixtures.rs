//! 테스트용 조건/엔티티 타입

use serde::{Deserialize, Serialize};
use serde_json::Value;

use sift_core::metadata::{Annotations, DomainPath, NestedQueries, NestedQuery, Relation};
use sift_core::{Criteria, Entity, IdWrapper, PageQuery};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserLevel {
    Normal,
    Vip,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestQuery {
    #[serde(skip)]
    pub page: PageQuery,
    pub id: Option<i64>,
    pub id_in: Option<Vec<i64>>,
    pub id_not_in: Option<Vec<i64>>,
    pub id_lt: Option<i64>,
    pub username: Option<String>,
    pub username_like: Option<String>,
    pub email: Option<String>,
    pub username_or_email_or_mobile: Option<String>,
    pub user_level: Option<UserLevel>,
    pub user_level_in: Option<Vec<UserLevel>>,
    pub memo_null: bool,
    pub memo_not_null: bool,
    pub valid: Option<bool>,
    pub role_id: Option<i64>,
    pub account: Option<String>,
}

impl Criteria for TestQuery {
    fn table() -> &'static str {
        "user"
    }

    fn page(&self) -> &PageQuery {
        &self.page
    }

    fn annotate(a: &mut Annotations) {
        a.sub_query("roleId", "userId", "t_user_and_role")
            .query_field("account", "(username = ? OR email = ? OR mobile = ?)")
            .enum_as_string("userLevelIn");
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DynamicQuery {
    #[serde(skip)]
    pub page: PageQuery,
    pub user: Option<String>,
    pub project: Option<String>,
    pub score_lt: Option<i32>,
}

impl Criteria for DynamicQuery {
    fn table() -> &'static str {
        "t_dynamic_${user}_${project}"
    }

    fn page(&self) -> &PageQuery {
        &self.page
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PermissionQuery {
    #[serde(skip)]
    pub page: PageQuery,
    pub user_id: Option<i64>,
    pub user_id_in: Option<Vec<i64>>,
    pub valid_user: bool,
    pub role_code: Option<String>,
    pub perm_name: Option<String>,
}

impl Criteria for PermissionQuery {
    fn table() -> &'static str {
        "t_perm"
    }

    fn page(&self) -> &PageQuery {
        &self.page
    }

    fn annotate(a: &mut Annotations) {
        a.domain_path("userId", DomainPath::new(["user", "role", "perm"]))
            .domain_path("userIdIn", DomainPath::new(["user", "role", "perm"]))
            .nested(
                "validUser",
                NestedQueries::new(vec![
                    NestedQuery::new("permId", "t_role_and_perm"),
                    NestedQuery::new("roleId", "t_user_and_role")
                        .with_where("userId")
                        .with_extra("inner join t_user u on u.id = userId and u.valid = true"),
                ])
                .without_where(),
            )
            .nested(
                "roleCode",
                NestedQueries::new(vec![
                    NestedQuery::new("permId", "t_role_and_perm").with_where("roleId"),
                    NestedQuery::new("id", "t_role"),
                ]),
            );
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MenuQuery {
    #[serde(skip)]
    pub page: PageQuery,
    pub platform: Option<String>,
    pub role_id: Option<i64>,
    pub menu_name_like: Option<String>,
}

impl Criteria for MenuQuery {
    fn table() -> &'static str {
        "t_menu m"
    }

    fn page(&self) -> &PageQuery {
        &self.page
    }

    fn join() -> Option<&'static str> {
        Some("INNER JOIN t_role_and_menu rm ON rm.menuId = m.id AND rm.roleId = #{roleId}")
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoreQuery {
    #[serde(skip)]
    pub page: PageQuery,
    pub school_id_in: Option<Vec<String>>,
    pub score_ge: Option<f64>,
}

impl Criteria for ScoreQuery {
    fn table() -> &'static str {
        "t_score"
    }

    fn page(&self) -> &PageQuery {
        &self.page
    }

    fn group_by() -> Option<&'static str> {
        Some("schoolId, grade")
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserEntity {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub user_level: Option<UserLevel>,
    pub memo: Option<String>,
    pub valid: Option<bool>,
    #[serde(skip)]
    pub password_confirm: Option<String>,
}

impl Entity for UserEntity {
    fn table() -> &'static str {
        "t_user"
    }

    fn annotate(a: &mut Annotations) {
        a.id("id").generated("id").enum_as_string("userLevel");
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DictEntity {
    pub id: Option<String>,
    pub dict_key: Option<String>,
    pub dict_value: Option<String>,
}

impl Entity for DictEntity {
    fn table() -> &'static str {
        "t_dict"
    }

    fn annotate(a: &mut Annotations) {
        a.id("id");
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TenantUserEntity {
    pub id: Option<i64>,
    pub tenant: Option<String>,
    pub username: Option<String>,
}

impl Entity for TenantUserEntity {
    fn table() -> &'static str {
        "t_${tenant}_user"
    }

    fn annotate(a: &mut Annotations) {
        a.id("id").generated("id");
    }
}

#[derive(Debug, Serialize)]
pub struct TenantId {
    pub tenant: String,
    pub id: i64,
}

impl IdWrapper for TenantId {
    fn id(&self) -> Value {
        Value::from(self.id)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserView {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub roles: Option<Vec<RoleView>>,
    pub perms: Option<Vec<PermView>>,
    pub create_user: Option<Box<UserView>>,
    pub create_user_id: Option<i64>,
    pub orders: Option<Vec<OrderView>>,
}

impl Entity for UserView {
    fn table() -> &'static str {
        "t_user"
    }

    fn annotate(a: &mut Annotations) {
        a.relation("roles", Relation::to_many(DomainPath::new(["user", "role"])))
            .relation(
                "perms",
                Relation::to_many(DomainPath::new(["user", "role", "perm"])),
            )
            .relation(
                "createUser",
                Relation::to_one(
                    DomainPath::new(["user"]).with_last_domain_id_column("createUserId"),
                ),
            )
            .relation(
                "orders",
                Relation::to_many(DomainPath::new(["order"]).with_last_domain_id_column("userId")),
            );
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoleView {
    pub id: Option<i64>,
    pub role_name: Option<String>,
    pub role_code: Option<String>,
    pub users: Option<Vec<UserView>>,
}

impl Entity for RoleView {
    fn table() -> &'static str {
        "t_role"
    }

    fn annotate(a: &mut Annotations) {
        a.relation("users", Relation::to_many(DomainPath::new(["user", "role"])));
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PermView {
    pub id: Option<i64>,
    pub perm_name: Option<String>,
    pub valid: Option<bool>,
}

impl Entity for PermView {
    fn table() -> &'static str {
        "t_perm"
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderView {
    pub id: Option<i64>,
    pub user_id: Option<i64>,
    pub amount: Option<f64>,
}

impl Entity for OrderView {
    fn table() -> &'static str {
        "t_order"
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoleQuery {
    #[serde(skip)]
    pub page: PageQuery,
    pub role_name_like: Option<String>,
    pub valid: Option<bool>,
}

impl Criteria for RoleQuery {
    fn table() -> &'static str {
        "t_role"
    }

    fn page(&self) -> &PageQuery {
        &self.page
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogQuery {
    #[serde(skip)]
    pub page: PageQuery,
    pub created_at_ge: Option<chrono::NaiveDate>,
    pub created_at_lt: Option<chrono::NaiveDate>,
}

impl Criteria for LogQuery {
    fn table() -> &'static str {
        "t_log"
    }

    fn page(&self) -> &PageQuery {
        &self.page
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemoQuery {
    #[serde(skip)]
    pub page: PageQuery,
    pub memo_null: Option<bool>,
    pub memo_not_null: Option<bool>,
    pub deleted: Option<bool>,
}

impl Criteria for MemoQuery {
    fn table() -> &'static str {
        "t_memo"
    }

    fn page(&self) -> &PageQuery {
        &self.page
    }

    fn annotate(a: &mut Annotations) {
        a.query_field("deleted", "deleteTime IS NOT NULL");
    }
}
