//! The same contracts under cw-multi-test's `App`, which routes messages,
//! delivers submessage replies and moves bank funds on its own. Replies carry
//! the events exactly as the multi-test runtime emits them.

use anyhow::{bail, Result as AnyResult};
use cosmwasm_std::{
    coins, Addr, Api, BankMsg, BankQuery, Binary, BlockInfo, CustomMsg, CustomQuery, Event, Querier,
    Storage, Uint128, Uint256,
};
use cw_multi_test::{
    App, AppBuilder, AppResponse, Bank, BankKeeper, BankSudo, ContractWrapper, CosmosRouter,
    Executor, Module,
};
use serde::de::DeserializeOwned;
use verilot_common::{derive_random_words, winner_index, LotteryStatus};
use verilot_lottery::msg::{
    CheckUpkeepResponse, ExecuteMsg as LotteryExecuteMsg, InstantiateMsg as LotteryInstantiateMsg,
    QueryMsg as LotteryQueryMsg,
};
use verilot_lottery::state::{LotteryStateInfo, RoundResult};
use verilot_lottery::ContractError as LotteryError;
use verilot_vrf_coordinator_mock::msg::{
    ExecuteMsg as CoordinatorExecuteMsg, InstantiateMsg as CoordinatorInstantiateMsg,
    QueryMsg as CoordinatorQueryMsg,
};
use verilot_vrf_coordinator_mock::state::{RandomnessRequest, Subscription};
use verilot_vrf_coordinator_mock::ContractError as CoordinatorError;

use crate::{
    BASE_FEE, CALLBACK_GAS_LIMIT, DENOM, ENTRANCE_FEE, FULFILLMENT_COST, GAS_PRICE, INTERVAL,
    KEY_HASH, SUBSCRIPTION_FUNDING,
};

const STARTING_BALANCE: u128 = 1_000;

// ─── Bank ───

/// Bank keeper that refuses transfers to one blocked account, like a chain's
/// blocked module addresses.
struct BlockedAddrBank {
    keeper: BankKeeper,
    blocked: Addr,
}

impl Module for BlockedAddrBank {
    type ExecT = BankMsg;
    type QueryT = BankQuery;
    type SudoT = BankSudo;

    fn execute<ExecC, QueryC>(
        &self,
        api: &dyn Api,
        storage: &mut dyn Storage,
        router: &dyn CosmosRouter<ExecC = ExecC, QueryC = QueryC>,
        block: &BlockInfo,
        sender: Addr,
        msg: BankMsg,
    ) -> AnyResult<AppResponse>
    where
        ExecC: CustomMsg + DeserializeOwned + 'static,
        QueryC: CustomQuery + DeserializeOwned + 'static,
    {
        if let BankMsg::Send { to_address, .. } = &msg {
            if *to_address == self.blocked.as_str() {
                bail!("{to_address} is not allowed to receive funds");
            }
        }
        self.keeper.execute(api, storage, router, block, sender, msg)
    }

    fn query(
        &self,
        api: &dyn Api,
        storage: &dyn Storage,
        querier: &dyn Querier,
        block: &BlockInfo,
        request: BankQuery,
    ) -> AnyResult<Binary> {
        self.keeper.query(api, storage, querier, block, request)
    }

    fn sudo<ExecC, QueryC>(
        &self,
        api: &dyn Api,
        storage: &mut dyn Storage,
        router: &dyn CosmosRouter<ExecC = ExecC, QueryC = QueryC>,
        block: &BlockInfo,
        msg: BankSudo,
    ) -> AnyResult<AppResponse>
    where
        ExecC: CustomMsg + DeserializeOwned + 'static,
        QueryC: CustomQuery + DeserializeOwned + 'static,
    {
        self.keeper.sudo(api, storage, router, block, msg)
    }
}

impl Bank for BlockedAddrBank {}

// ─── Suite ───

struct Suite {
    app: App<BlockedAddrBank>,
    lottery: Addr,
    coordinator: Addr,
    deployer: Addr,
    keeper: Addr,
}

impl Suite {
    /// Both contracts deployed, subscription 1 funded with the lottery as its
    /// consumer. Every named player starts with [`STARTING_BALANCE`].
    fn new(players: &[&str], blocked: &str, draw_timeout_seconds: Option<u64>) -> Self {
        let api = cosmwasm_std::testing::MockApi::default();
        let funded: Vec<Addr> = players.iter().map(|name| api.addr_make(name)).collect();
        let bank = BlockedAddrBank {
            keeper: BankKeeper::new(),
            blocked: api.addr_make(blocked),
        };

        let mut app = AppBuilder::new()
            .with_bank(bank)
            .build(|router, _api, storage| {
                for addr in &funded {
                    router
                        .bank
                        .keeper
                        .init_balance(storage, addr, coins(STARTING_BALANCE, DENOM))
                        .unwrap();
                }
            });

        let deployer = app.api().addr_make("deployer");
        let keeper = app.api().addr_make("keeper");

        let coordinator_code = app.store_code(Box::new(ContractWrapper::new(
            verilot_vrf_coordinator_mock::contract::execute,
            verilot_vrf_coordinator_mock::contract::instantiate,
            verilot_vrf_coordinator_mock::contract::query,
        )));
        let lottery_code = app.store_code(Box::new(
            ContractWrapper::new(
                verilot_lottery::contract::execute,
                verilot_lottery::contract::instantiate,
                verilot_lottery::contract::query,
            )
            .with_reply(verilot_lottery::contract::reply),
        ));

        let coordinator = app
            .instantiate_contract(
                coordinator_code,
                deployer.clone(),
                &CoordinatorInstantiateMsg {
                    base_fee: Uint128::from(BASE_FEE),
                    gas_price: Uint128::from(GAS_PRICE),
                },
                &[],
                "vrf-coordinator",
                None,
            )
            .unwrap();
        let lottery = app
            .instantiate_contract(
                lottery_code,
                deployer.clone(),
                &LotteryInstantiateMsg {
                    vrf_coordinator: coordinator.to_string(),
                    denom: DENOM.to_string(),
                    entrance_fee: Uint128::from(ENTRANCE_FEE),
                    interval_seconds: INTERVAL,
                    key_hash: KEY_HASH.to_string(),
                    subscription_id: 1,
                    callback_gas_limit: CALLBACK_GAS_LIMIT,
                    request_confirmations: None,
                    draw_timeout_seconds,
                },
                &[],
                "verilot",
                None,
            )
            .unwrap();

        let setup = [
            CoordinatorExecuteMsg::CreateSubscription {},
            CoordinatorExecuteMsg::FundSubscription {
                sub_id: 1,
                amount: Uint128::from(SUBSCRIPTION_FUNDING),
            },
            CoordinatorExecuteMsg::AddConsumer {
                sub_id: 1,
                consumer: lottery.to_string(),
            },
        ];
        for msg in setup {
            app.execute_contract(deployer.clone(), coordinator.clone(), &msg, &[])
                .unwrap();
        }

        Suite {
            app,
            lottery,
            coordinator,
            deployer,
            keeper,
        }
    }

    fn addr(&self, name: &str) -> Addr {
        self.app.api().addr_make(name)
    }

    fn advance(&mut self, seconds: u64) {
        self.app.update_block(|block| {
            block.time = block.time.plus_seconds(seconds);
            block.height += seconds / 5;
        });
    }

    fn balance(&self, addr: &Addr) -> u128 {
        self.app
            .wrap()
            .query_balance(addr.to_string(), DENOM)
            .unwrap()
            .amount
            .u128()
    }

    fn pot(&self) -> u128 {
        self.balance(&self.lottery)
    }

    fn enter(&mut self, name: &str) -> AnyResult<Addr> {
        let player = self.addr(name);
        self.app.execute_contract(
            player.clone(),
            self.lottery.clone(),
            &LotteryExecuteMsg::EnterLottery {},
            &coins(ENTRANCE_FEE, DENOM),
        )?;
        Ok(player)
    }

    fn perform_upkeep(&mut self) -> AnyResult<AppResponse> {
        self.app.execute_contract(
            self.keeper.clone(),
            self.lottery.clone(),
            &LotteryExecuteMsg::PerformUpkeep {
                perform_data: Binary::default(),
            },
            &[],
        )
    }

    fn fulfill(&mut self, request_id: u64, words: Option<Vec<Uint256>>) -> AnyResult<AppResponse> {
        let consumer = self.lottery.to_string();
        let msg = match words {
            Some(words) => CoordinatorExecuteMsg::FulfillRandomWordsWithOverride {
                request_id,
                consumer,
                words,
            },
            None => CoordinatorExecuteMsg::FulfillRandomWords {
                request_id,
                consumer,
            },
        };
        self.app
            .execute_contract(self.keeper.clone(), self.coordinator.clone(), &msg, &[])
    }

    fn query_lottery<T: DeserializeOwned>(&self, msg: LotteryQueryMsg) -> T {
        self.app
            .wrap()
            .query_wasm_smart(self.lottery.to_string(), &msg)
            .unwrap()
    }

    fn query_coordinator<T: DeserializeOwned>(&self, msg: CoordinatorQueryMsg) -> T {
        self.app
            .wrap()
            .query_wasm_smart(self.coordinator.to_string(), &msg)
            .unwrap()
    }

    fn lottery_state(&self) -> LotteryStateInfo {
        self.query_lottery(LotteryQueryMsg::State {})
    }

    fn subscription_balance(&self) -> u128 {
        let sub: Option<Subscription> =
            self.query_coordinator(CoordinatorQueryMsg::Subscription { sub_id: 1 });
        sub.unwrap().balance.u128()
    }

    fn request(&self, request_id: u64) -> Option<RandomnessRequest> {
        self.query_coordinator(CoordinatorQueryMsg::Request { request_id })
    }
}

/// Whether any layer of `err` reads as `expected`.
fn caused_by(err: &anyhow::Error, expected: impl ToString) -> bool {
    let expected = expected.to_string();
    err.chain().any(|cause| cause.to_string().contains(&expected))
}

fn find_event<'a>(res: &'a AppResponse, ty: &str) -> Option<&'a Event> {
    res.events.iter().find(|e| e.ty == ty)
}

fn attr<'a>(event: &'a Event, key: &str) -> Option<&'a str> {
    event
        .attributes
        .iter()
        .find(|a| a.key == key)
        .map(|a| a.value.as_str())
}

// ─── Tests ───

#[test]
fn test_app_full_round() {
    let mut suite = Suite::new(&["alice", "bob", "carol"], "nobody", None);
    let alice = suite.enter("alice").unwrap();
    let bob = suite.enter("bob").unwrap();
    let carol = suite.enter("carol").unwrap();
    assert_eq!(suite.pot(), 300);
    assert_eq!(suite.balance(&alice), STARTING_BALANCE - ENTRANCE_FEE);

    suite.advance(INTERVAL + 1);
    let check: CheckUpkeepResponse = suite.query_lottery(LotteryQueryMsg::CheckUpkeep {
        check_data: Binary::default(),
    });
    assert!(check.upkeep_needed);

    // The request id the lottery stored came out of the runtime's own reply
    let res = suite.perform_upkeep().unwrap();
    let requested = find_event(&res, "wasm-vrf_random_words_requested").unwrap();
    assert_eq!(attr(requested, "_contract_address"), Some(suite.coordinator.as_str()));
    assert_eq!(attr(requested, "request_id"), Some("1"));
    let draw = find_event(&res, "wasm-lottery_draw_requested").unwrap();
    assert_eq!(attr(draw, "_contract_address"), Some(suite.lottery.as_str()));
    assert_eq!(attr(draw, "request_id"), Some("1"));

    let state = suite.lottery_state();
    assert_eq!(state.status, LotteryStatus::Calculating);
    assert_eq!(state.pending_request_id, Some(1));
    assert_eq!(suite.request(1).unwrap().consumer, suite.lottery);

    suite.advance(6);
    suite.fulfill(1, None).unwrap();

    let word = derive_random_words(1, 1)[0];
    let index = winner_index(word, 3).unwrap() as usize;
    let winner = [alice, bob, carol][index].clone();
    assert_eq!(suite.balance(&winner), STARTING_BALANCE - ENTRANCE_FEE + 300);
    assert_eq!(suite.pot(), 0);

    let state = suite.lottery_state();
    assert_eq!(state.status, LotteryStatus::Open);
    assert_eq!(state.round, 2);
    assert_eq!(state.num_players, 0);
    assert_eq!(state.recent_winner, Some(winner.clone()));
    assert_eq!(state.last_draw_time, suite.app.block_info().time);

    assert!(suite.request(1).is_none());
    assert_eq!(suite.subscription_balance(), SUBSCRIPTION_FUNDING - FULFILLMENT_COST);

    let round: Option<RoundResult> = suite.query_lottery(LotteryQueryMsg::Round { round: 1 });
    let round = round.unwrap();
    assert_eq!(round.winner, winner);
    assert_eq!(round.random_word, word);
    assert_eq!(round.prize, Uint128::from(300u128));
}

#[test]
fn test_app_failed_payout_reverts_fulfillment() {
    let mut suite = Suite::new(&["alice", "mallory"], "mallory", None);
    let alice = suite.enter("alice").unwrap();
    suite.enter("mallory").unwrap();
    suite.advance(INTERVAL + 1);
    suite.perform_upkeep().unwrap();

    // 1 mod 2 = 1 picks mallory, whose account cannot receive the prize
    let err = suite.fulfill(1, Some(vec![Uint256::one()])).unwrap_err();
    assert!(caused_by(&err, "not allowed to receive funds"));

    let state = suite.lottery_state();
    assert_eq!(state.status, LotteryStatus::Calculating);
    assert_eq!(state.pending_request_id, Some(1));
    assert_eq!(state.num_players, 2);
    assert_eq!(state.recent_winner, None);
    assert_eq!(suite.pot(), 200);
    assert!(suite.request(1).is_some());
    assert_eq!(suite.subscription_balance(), SUBSCRIPTION_FUNDING);

    // The request is still open, so a different answer can settle the round
    suite.fulfill(1, Some(vec![Uint256::from(4u128)])).unwrap();
    assert_eq!(suite.balance(&alice), STARTING_BALANCE - ENTRANCE_FEE + 200);
    assert_eq!(suite.lottery_state().status, LotteryStatus::Open);
}

#[test]
fn test_app_rejected_callback_reverts_fulfillment() {
    let mut suite = Suite::new(&["alice"], "nobody", Some(600));
    suite.enter("alice").unwrap();
    suite.advance(INTERVAL + 1);
    suite.perform_upkeep().unwrap();

    suite.advance(600);
    suite
        .app
        .execute_contract(
            suite.keeper.clone(),
            suite.lottery.clone(),
            &LotteryExecuteMsg::ExpireDraw {},
            &[],
        )
        .unwrap();

    // The lottery turns the late answer down, so the coordinator neither
    // charges for it nor forgets the request
    let err = suite.fulfill(1, None).unwrap_err();
    assert!(caused_by(&err, LotteryError::UnknownRequest { request_id: 1 }));
    assert!(suite.request(1).is_some());
    assert_eq!(suite.subscription_balance(), SUBSCRIPTION_FUNDING);

    let state = suite.lottery_state();
    assert_eq!(state.status, LotteryStatus::Open);
    assert_eq!(state.num_players, 1);
    assert_eq!(suite.pot(), ENTRANCE_FEE);

    // A fresh draw gets a new id and pays out normally
    suite.advance(INTERVAL);
    suite.perform_upkeep().unwrap();
    assert_eq!(suite.lottery_state().pending_request_id, Some(2));
    suite.fulfill(2, None).unwrap();
    assert_eq!(suite.pot(), 0);
    assert_eq!(suite.subscription_balance(), SUBSCRIPTION_FUNDING - FULFILLMENT_COST);
}

#[test]
fn test_app_coordinator_failure_reverts_draw_request() {
    let mut suite = Suite::new(&["alice"], "nobody", None);
    let deployer = suite.deployer.clone();
    let remove = CoordinatorExecuteMsg::RemoveConsumer {
        sub_id: 1,
        consumer: suite.lottery.to_string(),
    };
    suite
        .app
        .execute_contract(deployer.clone(), suite.coordinator.clone(), &remove, &[])
        .unwrap();

    suite.enter("alice").unwrap();
    suite.advance(INTERVAL + 1);
    let err = suite.perform_upkeep().unwrap_err();
    let expected = CoordinatorError::InvalidConsumer {
        sub_id: 1,
        consumer: suite.lottery.to_string(),
    };
    assert!(caused_by(&err, expected));

    let state = suite.lottery_state();
    assert_eq!(state.status, LotteryStatus::Open);
    assert_eq!(state.pending_request_id, None);
    assert_eq!(state.draw_requested_at, None);
    assert_eq!(suite.pot(), ENTRANCE_FEE);
    assert!(suite.request(1).is_none());

    // Once the lottery is a consumer again the same round can be drawn
    let add = CoordinatorExecuteMsg::AddConsumer {
        sub_id: 1,
        consumer: suite.lottery.to_string(),
    };
    suite
        .app
        .execute_contract(deployer, suite.coordinator.clone(), &add, &[])
        .unwrap();
    suite.perform_upkeep().unwrap();
    assert_eq!(suite.lottery_state().pending_request_id, Some(1));
}
